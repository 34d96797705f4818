//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use mazegaki::core::format_output_path;

    #[test]
    fn as_is() {
        let final_destination =
            format_output_path("/home/username/Downloads/translated.html", Some(""));

        assert_eq!(final_destination, "/home/username/Downloads/translated.html");
    }

    #[test]
    fn stdout_marker_untouched() {
        assert_eq!(format_output_path("-", Some("ニュース")), "-");
    }

    #[test]
    fn substitute_japanese_title() {
        let final_destination =
            format_output_path("/tmp/%title%.en.html", Some("今日のニュース"));

        assert_eq!(final_destination, "/tmp/今日のニュース.en.html");
    }

    #[test]
    fn substitute_title_multi() {
        let final_destination = format_output_path(
            "/home/username/Downloads/%title%/%title%.html",
            Some("Document Title"),
        );

        assert_eq!(
            final_destination,
            "/home/username/Downloads/Document Title/Document Title.html"
        );
    }

    #[test]
    fn missing_title() {
        assert_eq!(format_output_path("out-%title%.html", None), "out-.html");
    }

    #[test]
    fn sanitize() {
        let final_destination = format_output_path(
            r#"/home/username/Downloads/<>:"|?/%title%.html"#,
            Some(r#"/\<>:"|?"#),
        );

        assert_eq!(
            final_destination,
            r#"/home/username/Downloads/<>:"|?/__[] - -.html"#
        );
    }

    #[test]
    fn level_up() {
        let final_destination = format_output_path("../%title%.html", Some(".Title"));

        assert_eq!(final_destination, r#"../Title.html"#);
    }

    #[test]
    fn timestamp_has_no_colons() {
        let final_destination = format_output_path("page-%timestamp%.html", None);

        assert!(final_destination.starts_with("page-"));
        assert!(final_destination.ends_with("Z.html"));
        assert!(!final_destination.contains(':'));
        assert!(!final_destination.contains("%timestamp%"));
    }
}

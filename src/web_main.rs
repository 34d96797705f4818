//! Web 服务器主程序入口

use mazegaki::env::init_tracing;
use mazegaki::translation::load_translation_config;
use mazegaki::web::{WebConfig, WebServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let mut web_config = WebConfig::default();

    // 简单的命令行参数解析
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    web_config.bind_addr = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --bind requires an address");
                    std::process::exit(1);
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    web_config.port = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: Invalid port number");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Error: Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    init_tracing(false);

    let translation_config = load_translation_config();
    if !translation_config.has_credential() {
        tracing::warn!("未配置 API Key，请求中必须提供 apiKey");
    }

    let server = WebServer::new(web_config, translation_config);
    server.start().await?;

    Ok(())
}

fn print_help() {
    println!("Mazegaki Web Server");
    println!();
    println!("USAGE:");
    println!("    mazegaki-web [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -b, --bind <ADDRESS>     Bind address [default: 127.0.0.1]");
    println!("    -p, --port <PORT>        Port number [default: 7080]");
    println!("    -h, --help               Print help information");
    println!();
    println!("ENDPOINTS:");
    println!("    GET  /health");
    println!("    POST /api/message");
    println!("    POST /api/translate-batch");
    println!("    POST /api/translate-page");
}

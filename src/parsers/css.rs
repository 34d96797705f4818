//! CSS 解析器模块
//!
//! 解析元素的内联 `style` 声明，用于判断元素是否被隐藏。
//! 使用 cssparser 进行词法分析，支持 `!important`。

use cssparser::{Parser, ParserInput, ToCss, Token};

/// 一条 CSS 声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
    /// 小写属性名
    pub name: String,
    /// 去掉 `!important` 之后的值
    pub value: String,
    pub important: bool,
}

/// 解析内联样式声明列表
///
/// 无法识别的声明会被跳过，解析不会失败。
pub fn parse_inline_style(style: &str) -> Vec<StyleDeclaration> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let name = match parser.next() {
            Ok(Token::Ident(name)) => name.to_ascii_lowercase(),
            Ok(Token::Semicolon) => continue,
            Ok(_) => {
                skip_declaration(&mut parser);
                continue;
            }
            Err(_) => break,
        };

        parser.skip_whitespace();
        match parser.next() {
            Ok(Token::Colon) => {}
            Ok(_) => {
                skip_declaration(&mut parser);
                continue;
            }
            Err(_) => break,
        }

        let mut tokens: Vec<Token> = Vec::new();
        loop {
            match parser.next_including_whitespace() {
                Ok(Token::Semicolon) | Err(_) => break,
                Ok(token) => tokens.push(token.clone()),
            }
        }

        let important = strip_important(&mut tokens);
        let value: String = tokens.iter().map(|token| token.to_css_string()).collect();
        let value = value.trim().to_string();

        if !value.is_empty() {
            declarations.push(StyleDeclaration {
                name,
                value,
                important,
            });
        }
    }

    declarations
}

fn skip_declaration(parser: &mut Parser) {
    while let Ok(token) = parser.next_including_whitespace() {
        if matches!(token, Token::Semicolon) {
            break;
        }
    }
}

/// 去掉结尾的 `! important`，返回是否存在
fn strip_important(tokens: &mut Vec<Token>) -> bool {
    while matches!(tokens.last(), Some(Token::WhiteSpace(_))) {
        tokens.pop();
    }

    let is_important_ident =
        matches!(tokens.last(), Some(Token::Ident(ident)) if ident.eq_ignore_ascii_case("important"));
    if !is_important_ident {
        return false;
    }

    let mut position = tokens.len() - 1;
    while position > 0 && matches!(tokens[position - 1], Token::WhiteSpace(_)) {
        position -= 1;
    }

    if position > 0 && matches!(tokens[position - 1], Token::Delim('!')) {
        tokens.truncate(position - 1);
        true
    } else {
        false
    }
}

/// 查找属性的生效值
///
/// 同名声明中后出现的生效，除非前面的是 `!important` 而后面的不是。
pub fn effective_value<'a>(declarations: &'a [StyleDeclaration], name: &str) -> Option<&'a str> {
    let mut current: Option<&StyleDeclaration> = None;

    for declaration in declarations.iter().filter(|d| d.name == name) {
        match current {
            Some(existing) if existing.important && !declaration.important => {}
            _ => current = Some(declaration),
        }
    }

    current.map(|declaration| declaration.value.as_str())
}

/// 元素自身内联样式中与可见性相关的部分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineVisibility {
    /// `display: none`
    pub display_none: bool,
    /// `opacity: 0`
    pub opacity_zero: bool,
    /// `visibility` 声明：Some(true) 为 hidden/collapse，Some(false) 为 visible，None 为继承
    pub visibility_hidden: Option<bool>,
}

impl InlineVisibility {
    /// 从内联样式解析
    pub fn from_style(style: &str) -> Self {
        let declarations = parse_inline_style(style);

        let display_none = effective_value(&declarations, "display")
            .map_or(false, |value| value.eq_ignore_ascii_case("none"));

        let opacity_zero = effective_value(&declarations, "opacity").map_or(false, is_zero_opacity);

        let visibility_hidden = effective_value(&declarations, "visibility").and_then(|value| {
            match value.to_ascii_lowercase().as_str() {
                "hidden" | "collapse" => Some(true),
                "visible" => Some(false),
                _ => None,
            }
        });

        Self {
            display_none,
            opacity_zero,
            visibility_hidden,
        }
    }
}

fn is_zero_opacity(value: &str) -> bool {
    let number = value.trim().trim_end_matches('%');
    number.parse::<f32>().map_or(false, |opacity| opacity == 0.0)
}

use crate::shell::command::Command;

// 按空白切分；以引号开头的参数一直取到下一个引号，可包含空格
fn tokenize(input: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = input.trim().chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                token.push(c);
            }
            if !closed {
                return None; // 引号未闭合
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }
    Some(tokens)
}

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens = tokenize(input)?;
    let (cmd, args) = tokens.split_first()?;
    let number = |i: usize| args.get(i)?.parse::<usize>().ok();

    match cmd.to_ascii_lowercase().as_str() {
        "help" => Some(Command::Help),
        "ls" | "list" => Some(Command::List {
            json: args.iter().any(|a| a == "--json"),
        }),
        "create" if args.len() == 2 => Some(Command::Create(args[0].clone(), number(1)?)),
        // 空数据不算合法写命令
        "write" if args.len() == 3 && !args[2].is_empty() => Some(Command::Write(
            args[0].clone(),
            number(1)?,
            args[2].clone(),
        )),
        "read" if args.len() == 3 => {
            Some(Command::Read(args[0].clone(), number(1)?, number(2)?))
        }
        "rm" | "delete" if args.len() == 1 => Some(Command::Delete(args[0].clone())),
        "stat" if args.len() == 1 => Some(Command::Stat(args[0].clone())),
        "check" => Some(Command::Check),
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_write_payload() {
        match parse_command(r#"WRITE notes.txt 12 "Hola, mundo""#) {
            Some(Command::Write(name, offset, data)) => {
                assert_eq!(name, "notes.txt");
                assert_eq!(offset, 12);
                assert_eq!(data, "Hola, mundo");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn parses_numeric_arguments() {
        assert!(matches!(
            parse_command("create a 1000"),
            Some(Command::Create(ref n, 1000)) if n == "a"
        ));
        assert!(matches!(
            parse_command("read a 0 11"),
            Some(Command::Read(_, 0, 11))
        ));
        assert!(matches!(
            parse_command("ls --json"),
            Some(Command::List { json: true })
        ));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_command("create a").is_none());
        assert!(parse_command("create a -5").is_none());
        assert!(parse_command(r#"write a 0 "unterminated"#).is_none());
        assert!(parse_command("format").is_none());
        assert!(parse_command(r#"write a 0 """#).is_none());
        assert!(parse_command("").is_none());
    }
}

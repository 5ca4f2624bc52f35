//! Demo scripts
//!
//! One command per line, `#` starts a comment. Instances are addressed by
//! their number (`tabs#2` is `2`), triggers by identifier.
//!
//! ```text
//! click b
//! key b ArrowRight
//! advance 400
//! show 1 c
//! accordion 1 on
//! viewport 600
//! idle
//! ```

use anyhow::{Context, Result, bail};
use tabset::{Key, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Click(String),
    Hover(String),
    Key(String, Key),
    Show(u64, Target),
    Next(u64),
    Prev(u64),
    Accordion(u64, bool),
    Enable(u64),
    Disable(u64),
    Refresh(u64),
    Destroy(u64),
    /// Move the clock forward by this many ms
    Advance(u64),
    /// Run until nothing but autoplay is pending
    Idle,
    Viewport(u32),
    ReducedMotion(bool),
    State,
    Dump,
}

/// Parse a whole script into `(line number, command)` pairs
pub fn parse(text: &str) -> Result<Vec<(usize, Command)>> {
    let mut out = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let command = parse_line(line).with_context(|| format!("line {}: `{}`", index + 1, raw.trim()))?;
        out.push((index + 1, command));
    }
    Ok(out)
}

fn parse_line(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let arg = |n: usize| -> Result<&str> {
        words
            .get(n)
            .copied()
            .with_context(|| format!("`{}` needs {} argument(s)", words[0], n))
    };

    let command = match words[0] {
        "click" => Command::Click(arg(1)?.to_string()),
        "hover" => Command::Hover(arg(1)?.to_string()),
        "key" => Command::Key(arg(1)?.to_string(), arg(2)?.parse()?),
        "show" => Command::Show(instance(arg(1)?)?, words[2..].join(" ").parse()?),
        "next" => Command::Next(instance(arg(1)?)?),
        "prev" => Command::Prev(instance(arg(1)?)?),
        "accordion" => Command::Accordion(instance(arg(1)?)?, switch(arg(2)?)?),
        "enable" => Command::Enable(instance(arg(1)?)?),
        "disable" => Command::Disable(instance(arg(1)?)?),
        "refresh" => Command::Refresh(instance(arg(1)?)?),
        "destroy" => Command::Destroy(instance(arg(1)?)?),
        "advance" => Command::Advance(arg(1)?.trim_end_matches("ms").parse().context("bad duration")?),
        "idle" => Command::Idle,
        "viewport" => Command::Viewport(arg(1)?.trim_end_matches("px").parse().context("bad width")?),
        "reduce-motion" => Command::ReducedMotion(switch(arg(1)?)?),
        "state" => Command::State,
        "dump" => Command::Dump,
        other => bail!("unknown command `{other}`"),
    };
    if matches!(command, Command::Show(_, Target::Id(ref id)) if id.is_empty()) {
        bail!("`show` needs a target");
    }
    Ok(command)
}

/// `#` opens a comment at the start of a line or after whitespace, so
/// `tabs#2` survives
fn strip_comment(line: &str) -> &str {
    let mut prev = ' ';
    for (at, c) in line.char_indices() {
        if c == '#' && prev.is_whitespace() {
            return &line[..at];
        }
        prev = c;
    }
    line
}

fn instance(word: &str) -> Result<u64> {
    word.trim_start_matches("tabs#")
        .parse()
        .with_context(|| format!("bad instance `{word}`"))
}

fn switch(word: &str) -> Result<bool> {
    match word {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        _ => bail!("expected on/off, got `{word}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = "\
# gallery walkthrough
click b
key b ArrowRight   # wraps
show tabs#1 2
show 1 intro
advance 300ms

accordion 1 on
idle
";
        let commands = parse(script).unwrap();
        assert_eq!(
            commands,
            vec![
                (2, Command::Click("b".into())),
                (3, Command::Key("b".into(), Key::ArrowRight)),
                (4, Command::Show(1, Target::Index(2))),
                (5, Command::Show(1, Target::Id("intro".into()))),
                (6, Command::Advance(300)),
                (8, Command::Accordion(1, true)),
                (9, Command::Idle),
            ]
        );
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = parse("click a\nfly away\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        assert!(parse("show 1").is_err());
        assert!(parse("key a Tab").is_err());
        assert!(parse("accordion 1 maybe").is_err());
        assert!(parse("advance soon").is_err());
        assert!(parse("click").is_err());
    }

    #[test]
    fn test_viewport_and_motion() {
        let commands = parse("viewport 600px\nreduce-motion on\ndump\n").unwrap();
        assert_eq!(commands[0].1, Command::Viewport(600));
        assert_eq!(commands[1].1, Command::ReducedMotion(true));
        assert_eq!(commands[2].1, Command::Dump);
    }
}

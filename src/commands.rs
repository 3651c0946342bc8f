//! Regex-driven dispatch of entered command lines onto callbacks.

use anyhow::{Context, Result};
use regex::Regex;

type Callback = Box<dyn FnMut(&[&str]) -> Result<()>>;

struct Matcher {
    pattern: Regex,
    callback: Callback,
}

/// Maps entered command strings onto callbacks via regular expressions.
///
/// Matchers are tried in registration order; the first pattern that matches
/// wins and its callback receives the capture groups of the match.
#[derive(Default)]
pub struct CommandProcessor {
    matchers: Vec<Matcher>,
}

impl CommandProcessor {
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Compiles `pattern` and registers `callback` for lines matching it.
    pub fn when_matching(
        self,
        pattern: &str,
        callback: impl FnMut(&[&str]) -> Result<()> + 'static,
    ) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("invalid command pattern {pattern:?}"))?;
        Ok(self.when_regex(regex, callback))
    }

    /// Registers `callback` for lines matching a precompiled `pattern`.
    pub fn when_regex(
        mut self,
        pattern: Regex,
        callback: impl FnMut(&[&str]) -> Result<()> + 'static,
    ) -> Self {
        self.matchers.push(Matcher {
            pattern,
            callback: Box::new(callback),
        });
        self
    }

    /// Tries `line` against every registered pattern in registration order.
    ///
    /// On the first match the callback is invoked with the capture groups
    /// (group 0 is the whole match, unmatched optional groups are empty) and
    /// its result is returned in `Some`. `None` means no pattern matched and
    /// the caller decides what "command not understood" looks like.
    pub fn process(&mut self, line: &str) -> Option<Result<()>> {
        for matcher in &mut self.matchers {
            if let Some(caps) = matcher.pattern.captures(line) {
                let groups: Vec<&str> = caps
                    .iter()
                    .map(|c| c.map(|m| m.as_str()).unwrap_or(""))
                    .collect();
                return Some((matcher.callback)(&groups));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::anyhow;
    use regex::Regex;

    use super::CommandProcessor;

    #[test]
    fn first_matching_pattern_wins() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let first = hits.clone();
        let second = hits.clone();
        let mut processor = CommandProcessor::new()
            .when_matching(r"^send (\S+)$", move |groups| {
                first.borrow_mut().push(format!("send:{}", groups[1]));
                Ok(())
            })
            .expect("pattern")
            .when_matching(r"^\w+", move |_| {
                second.borrow_mut().push("fallback".to_string());
                Ok(())
            })
            .expect("pattern");

        assert!(processor.process("send hello").expect("matched").is_ok());
        assert!(processor.process("quit").expect("matched").is_ok());
        assert_eq!(*hits.borrow(), vec!["send:hello", "fallback"]);
    }

    #[test]
    fn no_match_yields_none() {
        let mut processor = CommandProcessor::new()
            .when_matching(r"^time$", |_| Ok(()))
            .expect("pattern");
        assert!(processor.process("weather").is_none());
    }

    #[test]
    fn callback_error_propagates() {
        let mut processor = CommandProcessor::new()
            .when_matching(r"^boom$", |_| Err(anyhow!("it broke")))
            .expect("pattern");
        let result = processor.process("boom").expect("matched");
        assert_eq!(result.expect_err("error").to_string(), "it broke");
    }

    #[test]
    fn precompiled_regex_is_accepted() {
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = seen.clone();
        let regex = Regex::new(r"^echo (.*)$").expect("regex");
        let mut processor = CommandProcessor::new().when_regex(regex, move |groups| {
            *sink.borrow_mut() = groups[1].to_string();
            Ok(())
        });
        assert!(processor.process("echo some words").expect("matched").is_ok());
        assert_eq!(*seen.borrow(), "some words");
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let result = CommandProcessor::new().when_matching(r"(unclosed", |_| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn unmatched_optional_group_is_empty() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut processor = CommandProcessor::new()
            .when_matching(r"^show(?: (\S+))?$", move |groups| {
                sink.borrow_mut().push(groups[1].to_string());
                Ok(())
            })
            .expect("pattern");
        assert!(processor.process("show").expect("matched").is_ok());
        assert!(processor.process("show all").expect("matched").is_ok());
        assert_eq!(*seen.borrow(), vec!["", "all"]);
    }
}

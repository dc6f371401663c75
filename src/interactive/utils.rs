use std::fmt::Display;
use std::str::FromStr;

fn parse_answer<T>(answer: &str) -> Option<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    match answer.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            println!("Invalid value '{}': {err}", answer.trim());
            None
        }
    }
}

/// Re-prompts until the answer parses.
pub fn prompt_text_handle_errors<T>(prompt: &str) -> eyre::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    loop {
        let answer = inquire::Text::new(prompt).prompt()?;

        if let Some(value) = parse_answer(&answer) {
            return Ok(value);
        }
    }
}

/// Like [`prompt_text_handle_errors`] but Esc or an empty answer skip.
pub fn prompt_text_skippable_handle_errors<T>(
    prompt: &str,
) -> eyre::Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    loop {
        let Some(answer) = inquire::Text::new(prompt).prompt_skippable()? else {
            return Ok(None);
        };

        if answer.trim().is_empty() {
            return Ok(None);
        }

        if let Some(value) = parse_answer(&answer) {
            return Ok(Some(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChainId;

    #[test]
    fn parses_trimmed_answers() {
        assert_eq!(parse_answer::<ChainId>(" 1337 "), Some(ChainId(1337)));
        assert_eq!(parse_answer::<ChainId>("hardhat"), None);
    }
}

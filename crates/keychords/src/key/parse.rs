use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{anychar, char},
    combinator::{eof, opt},
    multi::many0,
    IResult,
};

use super::{Key, KeyModifiers, KeySymbol, ParseError};

enum Token<'a> {
    Single(char),
    Combo { body: &'a str, closed: bool },
}

fn parse_combo(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('<')(input)?;
    let (input, body) = take_while(|c| c != '>')(input)?;
    let (input, closed) = opt(char('>'))(input)?;

    Ok((input, Token::Combo { body, closed: closed.is_some() }))
}

fn parse_single(input: &str) -> IResult<&str, Token<'_>> {
    let (input, c) = anychar(input)?;

    Ok((input, Token::Single(c)))
}

fn parse_tokens(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    let (input, tokens) = many0(alt((parse_combo, parse_single)))(input)?;
    let (input, _) = eof(input)?;

    Ok((input, tokens))
}

fn char_key(c: char, modifiers: KeyModifiers) -> Result<KeySymbol, ParseError> {
    if c.is_ascii_alphanumeric() {
        Ok(KeySymbol::new(Key::Char(c), modifiers))
    } else {
        Err(ParseError::UnrecognisedLetter(c.to_string()))
    }
}

fn combo_key(body: &str) -> Result<Option<KeySymbol>, ParseError> {
    // A "<" inside a combo reopens it; only the segment after the last one
    // counts.
    let body = match body.rfind('<') {
        Some(i) => &body[i + 1..],
        None => body,
    };

    let mut chars = body.chars();
    let (m, dash, k) = match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some(m), Some(dash), Some(k), None) => (m, dash, k),
        _ => return Ok(None),
    };

    if dash != '-' {
        return Ok(None);
    }

    let modifier = match m {
        'C' => KeyModifiers::CONTROL,
        'S' => KeyModifiers::SHIFT,
        'A' => KeyModifiers::ALT,
        _ => return Err(ParseError::UnrecognisedModifier),
    };

    let key = char_key(k, modifier)?;

    return Ok(Some(key));
}

pub(crate) fn parse_sequence_str(input: &str) -> Result<Vec<KeySymbol>, ParseError> {
    let tokens = match parse_tokens(input) {
        Ok((_, tokens)) => tokens,
        Err(_) => return Err(ParseError::UnrecognisedLetter(input.to_string())),
    };

    let mut keys = Vec::new();

    for token in tokens {
        match token {
            Token::Single(c) => {
                keys.push(char_key(c, KeyModifiers::NONE)?);
            },
            Token::Combo { closed: false, .. } => {
                // A trailing combo that never saw its ">" produces nothing.
            },
            Token::Combo { body, .. } => {
                if let Some(key) = combo_key(body)? {
                    keys.push(key);
                }
            },
        }
    }

    return Ok(keys);
}

//! Grammar for advisory replies
//!
//! Accepted (case-insensitive): `move <N>`, `move <N> <keyword>`,
//! `switch <N>`. Surrounding whitespace, backticks, quotes and one trailing
//! period are tolerated. Anything else is rejected rather than guessed at.

use crate::policy::{MoveCandidate, SwitchCandidate};
use crate::protocol::Action;
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{digit1, space1};
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::sequence::preceded;
use nom::{IResult, Parser};

/// A syntactically valid directive, not yet checked against the legal options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Move { index: usize, transform: bool },
    Switch { slot: usize },
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>()).parse(input)
}

fn directive<'a>(input: &'a str, keyword: &str) -> IResult<&'a str, Directive> {
    let move_directive = map(
        (
            tag_no_case("move"),
            space1,
            number,
            opt(preceded(space1, tag_no_case(keyword))),
        ),
        |(_, _, index, transform)| Directive::Move {
            index,
            transform: transform.is_some(),
        },
    );
    let switch_directive = map((tag_no_case("switch"), space1, number), |(_, _, slot)| {
        Directive::Switch { slot }
    });
    all_consuming(alt((move_directive, switch_directive))).parse(input)
}

fn is_quote(c: char) -> bool {
    matches!(c, '`' | '"' | '\'')
}

/// Strip tolerated decoration around the directive
fn undecorate(reply: &str) -> &str {
    let mut text = reply.trim();
    let mut period_seen = false;
    if let Some(rest) = text.strip_suffix('.') {
        text = rest.trim_end();
        period_seen = true;
    }
    text = text.trim_matches(is_quote).trim();
    if !period_seen {
        if let Some(rest) = text.strip_suffix('.') {
            text = rest.trim_end();
        }
    }
    text
}

/// Parse a reply into a directive
pub fn parse_directive(reply: &str, keyword: &str) -> Option<Directive> {
    directive(undecorate(reply), keyword)
        .ok()
        .map(|(_, parsed)| parsed)
}

/// Parse a reply and accept it only if it names one of the offered options
///
/// A transform request on a move is kept only when `can_transform` holds.
pub fn parse_reply(
    reply: &str,
    keyword: &str,
    moves: &[MoveCandidate],
    switches: &[SwitchCandidate],
    can_transform: bool,
) -> Option<Action> {
    match parse_directive(reply, keyword)? {
        Directive::Move { index, transform } => moves
            .iter()
            .any(|m| m.index == index)
            .then_some(Action::UseMove {
                move_index: index,
                with_transform: transform && can_transform,
            }),
        Directive::Switch { slot } => switches
            .iter()
            .any(|s| s.slot == slot)
            .then_some(Action::SwitchTo { slot }),
    }
}

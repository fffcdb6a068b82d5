//! Answer rule evaluation

use tagtune_core::{AnswerRule, PendingCard, TagMode};

/// Whether the collected cards satisfy `rule`.
///
/// Fewer cards than the rule requires never succeed.
pub fn evaluate(rule: &AnswerRule, pending: &[PendingCard]) -> bool {
    let need = rule.cards_required();
    match rule {
        AnswerRule::RequireTags { mode, tags, .. } => {
            if pending.len() < need {
                return false;
            }
            let on_cards = |tag: &String| pending.iter().any(|p| p.has_tag(tag));
            match mode {
                TagMode::Any => tags.iter().any(on_cards),
                TagMode::All => tags.iter().all(on_cards),
            }
        }
        AnswerRule::Sum {
            equals,
            required_tags,
            ..
        } => {
            if pending.len() != need {
                return false;
            }
            let mut sum: i64 = 0;
            for card in pending {
                if !required_tags.iter().all(|t| card.has_tag(t)) {
                    return false;
                }
                match card.value {
                    Some(v) if v >= 0 => sum += i64::from(v),
                    _ => return false,
                }
            }
            sum == i64::from(*equals)
        }
    }
}

/// Early check for a card collected while more are still needed.
///
/// `RequireTags(All)` rejects a card that carries none of the rule's tags;
/// `Sum` rejects a card without a value. Everything else passes.
pub fn card_can_contribute(rule: &AnswerRule, card: &PendingCard) -> bool {
    match rule {
        AnswerRule::RequireTags {
            mode: TagMode::All,
            tags,
            ..
        } => tags.iter().any(|t| card.has_tag(t)),
        AnswerRule::RequireTags { .. } => true,
        AnswerRule::Sum { .. } => card.value.is_some_and(|v| v >= 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(tags: &[&str], value: Option<i32>) -> PendingCard {
        PendingCard {
            uid: "00".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            value,
        }
    }

    fn require(mode: TagMode, tags: &[&str], cards: u8) -> AnswerRule {
        AnswerRule::RequireTags {
            mode,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            cards,
        }
    }

    fn sum(equals: i32, cards: u8, tags: &[&str]) -> AnswerRule {
        AnswerRule::Sum {
            equals,
            cards,
            required_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_require_any() {
        let rule = require(TagMode::Any, &["red"], 1);
        assert!(evaluate(&rule, &[card(&["red", "big"], None)]));
        assert!(!evaluate(&rule, &[card(&["blue"], None)]));
        assert!(!evaluate(&rule, &[]));
    }

    #[test]
    fn test_require_all_uses_union() {
        let rule = require(TagMode::All, &["red", "big"], 2);
        assert!(evaluate(
            &rule,
            &[card(&["red"], None), card(&["big"], None)]
        ));
        assert!(!evaluate(
            &rule,
            &[card(&["red"], None), card(&["small"], None)]
        ));
        // Union is right but too few cards
        assert!(!evaluate(&rule, &[card(&["red", "big"], None)]));
    }

    #[test]
    fn test_sum() {
        let rule = sum(10, 2, &["tal"]);
        assert!(evaluate(&rule, &[card(&["tal"], Some(4)), card(&["tal"], Some(6))]));
        assert!(!evaluate(&rule, &[card(&["tal"], Some(4)), card(&["tal"], Some(5))]));
        // Missing tag
        assert!(!evaluate(&rule, &[card(&["tal"], Some(4)), card(&[], Some(6))]));
        // Missing or negative value fails regardless of sum
        assert!(!evaluate(&rule, &[card(&["tal"], Some(10)), card(&["tal"], None)]));
        assert!(!evaluate(
            &rule,
            &[card(&["tal"], Some(12)), card(&["tal"], Some(-2))]
        ));
    }

    #[test]
    fn test_card_can_contribute() {
        let all = require(TagMode::All, &["red", "big"], 2);
        assert!(card_can_contribute(&all, &card(&["big"], None)));
        assert!(!card_can_contribute(&all, &card(&["blue"], None)));

        let any = require(TagMode::Any, &["red"], 2);
        assert!(card_can_contribute(&any, &card(&["blue"], None)));

        let total = sum(5, 2, &[]);
        assert!(card_can_contribute(&total, &card(&[], Some(0))));
        assert!(!card_can_contribute(&total, &card(&[], None)));
    }
}

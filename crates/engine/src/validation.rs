//! Declarative field validation.
//!
//! Each entity has a rule table mapping a field to a predicate; the table is
//! evaluated uniformly before persistence. Keeping the rules as data makes
//! them testable without touching storage.

use crate::{EngineError, Good, Hunter, Merchant, ResultEngine};

/// A single field rule: the predicate must hold for the value to be valid.
pub struct Rule<T> {
    pub field: &'static str,
    pub check: fn(&T) -> bool,
    pub message: &'static str,
}

/// An ordered rule table for one entity.
pub struct RuleSet<T: 'static> {
    entity: &'static str,
    rules: &'static [Rule<T>],
}

impl<T> RuleSet<T> {
    /// Evaluate every rule in order, failing on the first violation.
    pub fn check(&self, value: &T) -> ResultEngine<()> {
        for rule in self.rules {
            if !(rule.check)(value) {
                return Err(EngineError::Validation(format!(
                    "{}.{}: {}",
                    self.entity, rule.field, rule.message
                )));
            }
        }
        Ok(())
    }
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_uppercase())
}

fn alphabetic_with_spaces(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphabetic() || c == ' ')
}

fn alphanumeric_with_spaces(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == ' ')
}

fn length_between(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    min <= len && len <= max
}

static GOOD_RULES: [Rule<Good>; 7] = [
    Rule {
        field: "name",
        check: |g| starts_uppercase(&g.name),
        message: "must start with an uppercase letter",
    },
    Rule {
        field: "name",
        check: |g| alphabetic_with_spaces(&g.name),
        message: "may only contain letters and spaces",
    },
    Rule {
        field: "name",
        check: |g| length_between(&g.name, 2, 30),
        message: "must be between 2 and 30 characters",
    },
    Rule {
        field: "description",
        check: |g| starts_uppercase(&g.description) && alphanumeric_with_spaces(&g.description),
        message: "must start uppercase and contain only letters, digits and spaces",
    },
    Rule {
        field: "description",
        check: |g| length_between(&g.description, 10, 100),
        message: "must be between 10 and 100 characters",
    },
    Rule {
        field: "weight",
        check: |g| g.weight > 0.0,
        message: "must be greater than 0",
    },
    Rule {
        field: "value",
        check: |g| g.value > 0,
        message: "must be greater than 0",
    },
];

// Stock is validated separately: a freshly created good may not start
// negative, but 0 is fine (sold out).
static GOOD_STOCK_RULE: [Rule<Good>; 1] = [Rule {
    field: "stock",
    check: |g| g.stock >= 0,
    message: "must not be negative",
}];

static HUNTER_RULES: [Rule<Hunter>; 3] = [
    Rule {
        field: "name",
        check: |h| starts_uppercase(&h.name),
        message: "must start with an uppercase letter",
    },
    Rule {
        field: "name",
        check: |h| alphabetic_with_spaces(&h.name) && length_between(&h.name, 2, 30),
        message: "may only contain letters and spaces, 2 to 30 characters",
    },
    Rule {
        field: "location",
        check: |h| !h.location.trim().is_empty(),
        message: "must not be empty",
    },
];

static MERCHANT_RULES: [Rule<Merchant>; 3] = [
    Rule {
        field: "name",
        check: |m| starts_uppercase(&m.name),
        message: "must start with an uppercase letter",
    },
    Rule {
        field: "name",
        check: |m| alphabetic_with_spaces(&m.name) && length_between(&m.name, 2, 30),
        message: "may only contain letters and spaces, 2 to 30 characters",
    },
    Rule {
        field: "location",
        check: |m| !m.location.trim().is_empty(),
        message: "must not be empty",
    },
];

pub fn good_rules() -> RuleSet<Good> {
    RuleSet {
        entity: "good",
        rules: &GOOD_RULES,
    }
}

pub fn good_stock_rule() -> RuleSet<Good> {
    RuleSet {
        entity: "good",
        rules: &GOOD_STOCK_RULE,
    }
}

pub fn hunter_rules() -> RuleSet<Hunter> {
    RuleSet {
        entity: "hunter",
        rules: &HUNTER_RULES,
    }
}

pub fn merchant_rules() -> RuleSet<Merchant> {
    RuleSet {
        entity: "merchant",
        rules: &MERCHANT_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::Material;
    use uuid::Uuid;

    fn good(name: &str, description: &str, weight: f64, stock: i64, value: i64) -> Good {
        Good {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            material: Material::Steel,
            weight,
            stock,
            value,
        }
    }

    #[test]
    fn valid_good_passes() {
        let g = good("Silver Sword", "A blade for monsters", 3.5, 10, 500);
        good_rules().check(&g).unwrap();
        good_stock_rule().check(&g).unwrap();
    }

    #[test]
    fn lowercase_name_fails() {
        let g = good("silver sword", "A blade for monsters", 3.5, 10, 500);
        let err = good_rules().check(&g).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(
                "good.name: must start with an uppercase letter".to_string()
            )
        );
    }

    #[test]
    fn numeric_name_fails() {
        let g = good("Sword 2", "A blade for monsters", 3.5, 10, 500);
        assert!(good_rules().check(&g).is_err());
    }

    #[test]
    fn short_description_fails() {
        let g = good("Silver Sword", "Blade", 3.5, 10, 500);
        assert!(good_rules().check(&g).is_err());
    }

    #[test]
    fn non_positive_weight_and_value_fail() {
        assert!(
            good_rules()
                .check(&good("Silver Sword", "A blade for monsters", 0.0, 10, 500))
                .is_err()
        );
        assert!(
            good_rules()
                .check(&good("Silver Sword", "A blade for monsters", 3.5, 10, 0))
                .is_err()
        );
    }

    #[test]
    fn negative_stock_fails() {
        let g = good("Silver Sword", "A blade for monsters", 3.5, -1, 500);
        assert!(good_stock_rule().check(&g).is_err());
    }

    #[test]
    fn empty_location_fails() {
        let h = Hunter {
            id: Uuid::new_v4(),
            name: "Geralt".to_string(),
            race: crate::hunters::Race::Human,
            location: "  ".to_string(),
        };
        assert!(hunter_rules().check(&h).is_err());
    }

    #[test]
    fn merchant_rules_accept_valid() {
        let m = Merchant {
            id: Uuid::new_v4(),
            name: "Hattori".to_string(),
            kind: crate::merchants::MerchantKind::Blacksmith,
            location: "Novigrad".to_string(),
        };
        merchant_rules().check(&m).unwrap();
    }
}

//! Compact filter grammar
//!
//! Collection reads accept a flattened, comma-separated token stream made of
//! repeated groups `<opcode>,<count>,<arguments>`. The count is measured in
//! the opcode's own units: `field,value` pairs for the comparison opcodes,
//! values after the field for `in`, `not-in` and `array-contain`, and
//! `field,key,value` triples for `object-contain`. Each group expands into
//! one or more [`FilterCondition`]s, all ANDed in encountered order.
//!
//! ```text
//! equal,2,name,Jane,age,30,in,2,id,1a,1b
//! └─ equal(name, Jane)     └─ in(id, [1a, 1b])
//!    equal(age, 30)
//! ```
//!
//! Field names are taken verbatim and are trusted by the caller.

use crate::error::FilterGrammarError;

/// Fixed operator vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    In,
    NotIn,
    Like,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    JsonArrayContains,
    JsonObjectContains,
}

impl Operator {
    /// Canonical operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not-equal",
            Operator::In => "in",
            Operator::NotIn => "not-in",
            Operator::Like => "like",
            Operator::Greater => "greater",
            Operator::GreaterEqual => "greater-equal",
            Operator::Less => "less",
            Operator::LessEqual => "less-equal",
            Operator::JsonArrayContains => "json-array-contains",
            Operator::JsonObjectContains => "json-object-contains",
        }
    }

    /// SQL comparison symbol for the single-value comparison operators
    pub fn comparison_symbol(&self) -> Option<&'static str> {
        match self {
            Operator::Equal => Some("="),
            Operator::NotEqual => Some("!="),
            Operator::Greater => Some(">"),
            Operator::GreaterEqual => Some(">="),
            Operator::Less => Some("<"),
            Operator::LessEqual => Some("<="),
            _ => None,
        }
    }
}

/// One `(operator, field, operand...)` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCondition {
    /// `equal`, `not-equal`, `greater`, `greater-equal`, `less`, `less-equal`
    Compare {
        operator: Operator,
        field: String,
        value: String,
    },
    /// Substring match
    Like { field: String, value: String },
    In { field: String, values: Vec<String> },
    NotIn { field: String, values: Vec<String> },
    /// JSON array column contains every listed value
    JsonArrayContains { field: String, values: Vec<String> },
    /// JSON object column contains `key: value`
    JsonObjectContains {
        field: String,
        key: String,
        value: String,
    },
}

impl FilterCondition {
    /// Equality condition, used for lookups by id
    pub fn equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        FilterCondition::Compare {
            operator: Operator::Equal,
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            FilterCondition::Compare { operator, .. } => *operator,
            FilterCondition::Like { .. } => Operator::Like,
            FilterCondition::In { .. } => Operator::In,
            FilterCondition::NotIn { .. } => Operator::NotIn,
            FilterCondition::JsonArrayContains { .. } => Operator::JsonArrayContains,
            FilterCondition::JsonObjectContains { .. } => Operator::JsonObjectContains,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FilterCondition::Compare { field, .. }
            | FilterCondition::Like { field, .. }
            | FilterCondition::In { field, .. }
            | FilterCondition::NotIn { field, .. }
            | FilterCondition::JsonArrayContains { field, .. }
            | FilterCondition::JsonObjectContains { field, .. } => field,
        }
    }

    /// Flat `[operator, field, operand...]` form
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = vec![self.operator().as_str().to_string(), self.field().to_string()];
        match self {
            FilterCondition::Compare { value, .. } | FilterCondition::Like { value, .. } => {
                tokens.push(value.clone());
            }
            FilterCondition::In { values, .. }
            | FilterCondition::NotIn { values, .. }
            | FilterCondition::JsonArrayContains { values, .. } => {
                tokens.extend(values.iter().cloned());
            }
            FilterCondition::JsonObjectContains { key, value, .. } => {
                tokens.push(key.clone());
                tokens.push(value.clone());
            }
        }
        tokens
    }
}

/// How an opcode consumes its argument tokens
#[derive(Debug, Clone, Copy)]
enum Grouping {
    /// `(field, value)` pairs, one condition per pair
    Pairs(Operator),
    /// A single condition: field followed by one or more values
    List(Operator),
    /// `(field, key, value)` triples, one condition per triple
    Triples,
}

impl Grouping {
    /// Tokens claimed by `count` units, `None` when that overflows
    fn span(&self, count: usize) -> Option<usize> {
        match self {
            Grouping::Pairs(_) => count.checked_mul(2),
            Grouping::List(_) => count.checked_add(1),
            Grouping::Triples => count.checked_mul(3),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Grouping::Pairs(_) => "expected at least one field,value pair",
            Grouping::List(_) => "expected at least one value after the field",
            Grouping::Triples => "expected at least one field,key,value triple",
        }
    }
}

fn grouping_for(opcode: &str) -> Option<Grouping> {
    let grouping = match opcode {
        "equal" | "eq" => Grouping::Pairs(Operator::Equal),
        "not-equal" | "ne" => Grouping::Pairs(Operator::NotEqual),
        "like" | "lk" => Grouping::Pairs(Operator::Like),
        "greater" | "gt" => Grouping::Pairs(Operator::Greater),
        "greater-equal" | "ge" => Grouping::Pairs(Operator::GreaterEqual),
        "less" | "lt" => Grouping::Pairs(Operator::Less),
        "less-equal" | "le" => Grouping::Pairs(Operator::LessEqual),
        "in" => Grouping::List(Operator::In),
        "not-in" | "nin" => Grouping::List(Operator::NotIn),
        "array-contain" | "act" => Grouping::List(Operator::JsonArrayContains),
        "object-contain" | "oct" => Grouping::Triples,
        _ => return None,
    };
    Some(grouping)
}

/// Decode a compact filter query string into ordered conditions.
///
/// An empty string decodes to no conditions. The count after each opcode is
/// measured in that opcode's grouping units and must be at least one.
pub fn decode(query: &str) -> Result<Vec<FilterCondition>, FilterGrammarError> {
    let mut conditions = Vec::new();
    if query.is_empty() {
        return Ok(conditions);
    }

    let tokens: Vec<&str> = query.split(',').collect();
    let mut position = 0;

    while position < tokens.len() {
        let opcode = tokens[position];
        let count_token = tokens
            .get(position + 1)
            .ok_or(FilterGrammarError::MissingCount { position })?;
        let count: usize = count_token.parse().map_err(|_| FilterGrammarError::InvalidCount {
            opcode: opcode.to_string(),
            token: count_token.to_string(),
        })?;

        let grouping = grouping_for(opcode)
            .ok_or_else(|| FilterGrammarError::UnknownOpcode(opcode.to_string()))?;
        if count == 0 {
            return Err(FilterGrammarError::Arity {
                opcode: opcode.to_string(),
                count,
                expected: grouping.expected(),
            });
        }

        let start = position + 2;
        let remaining = tokens.len() - start;
        let span = grouping
            .span(count)
            .filter(|span| *span <= remaining)
            .ok_or_else(|| FilterGrammarError::Truncated {
                opcode: opcode.to_string(),
                declared: count,
                remaining,
            })?;

        expand_group(grouping, &tokens[start..start + span], &mut conditions);
        position = start + span;
    }

    Ok(conditions)
}

/// `args` holds exactly the span the grouping claimed
fn expand_group(grouping: Grouping, args: &[&str], out: &mut Vec<FilterCondition>) {
    match grouping {
        Grouping::Pairs(operator) => {
            for pair in args.chunks_exact(2) {
                let (field, value) = (pair[0].to_string(), pair[1].to_string());
                out.push(match operator {
                    Operator::Like => FilterCondition::Like { field, value },
                    _ => FilterCondition::Compare {
                        operator,
                        field,
                        value,
                    },
                });
            }
        }
        Grouping::List(operator) => {
            let field = args[0].to_string();
            let values = args[1..].iter().map(|v| v.to_string()).collect();
            out.push(match operator {
                Operator::In => FilterCondition::In { field, values },
                Operator::NotIn => FilterCondition::NotIn { field, values },
                _ => FilterCondition::JsonArrayContains { field, values },
            });
        }
        Grouping::Triples => {
            for triple in args.chunks_exact(3) {
                out.push(FilterCondition::JsonObjectContains {
                    field: triple[0].to_string(),
                    key: triple[1].to_string(),
                    value: triple[2].to_string(),
                });
            }
        }
    }
}

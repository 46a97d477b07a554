//! Soft-failing descent through dynamically-keyed documents
//!
//! Offer documents nest their prices under generated identifiers (SKU, offer
//! term code, rate code) that cannot be known ahead of time. The walker takes
//! a path of level descriptors and, at every `Step::First`, follows whatever
//! single key the current map holds. Any missing level ends the walk with
//! `None`; nothing here returns an error.

use crate::pricing::models::ExtractedPrice;
use serde_json::Value;
use tracing::trace;

/// One level of a walk path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'p> {
    /// Fixed-name child
    Key(&'p str),
    /// The sole key of the current map, or the first one if there are several
    First,
}

/// An optional ordered set of key-value pairs
pub trait KeyedNode {
    /// Child under `key`, if this node is a map containing it
    fn child(&self, key: &str) -> Option<&Self>;

    /// First child in the map's iteration order; `None` for non-maps and empty maps
    fn first_child(&self) -> Option<&Self>;

    /// Numeric value of a leaf, accepting numbers and numeric strings
    fn number(&self) -> Option<f64>;
}

impl KeyedNode for Value {
    fn child(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }

    fn first_child(&self) -> Option<&Self> {
        // serde_json maps iterate in key order, so "first" is the smallest key
        self.as_object()?.values().next()
    }

    fn number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// Follow `path` from `root`, returning the node it ends on.
pub fn walk<'a, N: KeyedNode>(root: &'a N, path: &[Step<'_>]) -> Option<&'a N> {
    let mut node = root;
    for (depth, step) in path.iter().enumerate() {
        let next = match step {
            Step::Key(name) => node.child(name),
            Step::First => node.first_child(),
        };

        node = match next {
            Some(next) => next,
            None => {
                trace!(depth, step = ?step, "Walk stopped early");
                return None;
            }
        };
    }
    Some(node)
}

/// Walk `path` and read the fixed-name numeric `leaf` of the node it ends on.
pub fn walk_price<N: KeyedNode>(root: &N, path: &[Step<'_>], leaf: &str) -> ExtractedPrice {
    let value = walk(root, path)
        .and_then(|node| node.child(leaf))
        .and_then(KeyedNode::number);

    ExtractedPrice::from_option(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PATH: &[Step<'static>] = &[
        Step::Key("terms"),
        Step::Key("OnDemand"),
        Step::First,
        Step::First,
        Step::Key("priceDimensions"),
        Step::First,
        Step::Key("pricePerUnit"),
    ];

    fn offer(price: Value) -> Value {
        json!({
            "terms": {
                "OnDemand": {
                    "JRTCKXETXF": {
                        "JRTCKXETXF.6YS6EN2CT7": {
                            "priceDimensions": {
                                "JRTCKXETXF.6YS6EN2CT7.6YS6EN2CT7": {
                                    "unit": "Hrs",
                                    "pricePerUnit": { "USD": price }
                                }
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_walk_price_string_leaf() {
        let doc = offer(json!("0.0104000000"));
        let price = walk_price(&doc, PATH, "USD");
        assert!(price.found);
        assert_eq!(price.value, 0.0104);
    }

    #[test]
    fn test_walk_price_numeric_leaf() {
        let doc = offer(json!(0.5));
        assert_eq!(walk_price(&doc, PATH, "USD").price(), Some(0.5));
    }

    #[test]
    fn test_walk_does_not_depend_on_key_names() {
        let doc = json!({
            "terms": { "OnDemand": { "a": { "b": {
                "priceDimensions": { "c": { "pricePerUnit": { "USD": "1.25" } } }
            } } } }
        });
        assert_eq!(walk_price(&doc, PATH, "USD").price(), Some(1.25));
    }

    #[test]
    fn test_walk_takes_first_key_when_several() {
        let doc = json!({ "b": { "v": 2 }, "a": { "v": 1 } });
        let node = walk(&doc, &[Step::First]).unwrap();
        assert_eq!(node["v"], 1);
    }

    #[test]
    fn test_walk_stops_on_empty_level() {
        let doc = json!({ "terms": { "OnDemand": {} } });
        assert!(walk(&doc, PATH).is_none());
        assert!(!walk_price(&doc, PATH, "USD").found);
    }

    #[test]
    fn test_walk_stops_on_non_map_level() {
        let doc = json!({ "terms": { "OnDemand": ["JRTCKXETXF"] } });
        assert!(walk(&doc, PATH).is_none());

        let doc = json!({ "terms": "n/a" });
        assert!(walk(&doc, PATH).is_none());
    }

    #[test]
    fn test_walk_missing_fixed_key() {
        let doc = json!({ "terms": { "Reserved": { "x": {} } } });
        assert!(walk(&doc, PATH).is_none());
    }

    #[test]
    fn test_walk_empty_path_returns_root() {
        let doc = json!({ "a": 1 });
        assert_eq!(walk(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_malformed_or_sentinel_leaf_is_not_found() {
        assert!(!walk_price(&offer(json!("n/a")), PATH, "USD").found);
        assert!(!walk_price(&offer(json!(null)), PATH, "USD").found);
        assert!(!walk_price(&offer(json!("0.0000000000")), PATH, "USD").found);
        assert!(!walk_price(&offer(json!(-3)), PATH, "USD").found);
    }

    #[test]
    fn test_missing_leaf_currency() {
        let doc = offer(json!("0.01"));
        assert!(!walk_price(&doc, PATH, "EUR").found);
    }
}

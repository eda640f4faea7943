//! Filter values and the matching primitive.
//!
//! A filter narrows which observers of a protocol receive a message. Filters
//! are a tagged union over the common value shapes plus an open `Custom`
//! variant, so arbitrary value types can take part in matching without the
//! registry knowing about them.
//!
//! Matching is directional: the receiver of [`Filter::matches`] is the
//! outgoing filter supplied with a message, the argument is the filter stored
//! with a registration. Every built-in variant is symmetric; only custom
//! adapters may choose an asymmetric relation.

/// JSON conversion into filter values.
mod json;
/// Stored-object identifiers and identified references.
pub mod object;
/// Regular-expression custom adapter.
pub mod pattern;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use object::{Identified, ObjectId};
pub use pattern::PatternFilter;

/// Open extension point for custom filter adapters.
///
/// Implementations must be pure: no observable side effects, safe to call
/// concurrently from any thread. A custom filter returns `false` for values
/// it does not understand, which is the cross-variant default.
pub trait FilterMatch: fmt::Debug + Send + Sync + 'static {
    /// Returns true if `self` matches `other` from a filtering perspective.
    fn matches(&self, other: &Filter) -> bool;

    /// Upcast used to recognise filters of the same concrete adapter type.
    fn as_any(&self) -> &dyn Any;
}

/// A filter value attached to a registration or to an outgoing message.
///
/// # Examples
///
/// ```
/// use protocast::Filter;
///
/// let red = Filter::from("red");
/// assert!(red.matches(&Filter::from("red")));
/// assert!(!red.matches(&Filter::from("blue")));
///
/// let seq = Filter::from(vec!["a", "b"]);
/// assert!(seq.matches(&Filter::from(vec!["a", "b"])));
/// assert!(!seq.matches(&Filter::from(vec!["b", "a"])));
/// ```
#[derive(Debug, Clone)]
pub enum Filter {
    /// Exact text equality.
    Text(String),
    /// Ordered sequence, matched element-wise in order.
    Sequence(Vec<Filter>),
    /// Unordered key/value mapping, matched on key set and per-key values.
    Mapping(BTreeMap<String, Filter>),
    /// Opaque stored-object identifier.
    Identifier(ObjectId),
    /// Object carrying an identifier; matches other references and bare identifiers.
    Reference(Arc<dyn Identified>),
    /// Caller-defined adapter.
    Custom(Arc<dyn FilterMatch>),
}

impl Filter {
    /// Text filter.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Ordered sequence filter.
    #[must_use]
    pub fn sequence<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Filter>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Key/value mapping filter.
    #[must_use]
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Filter>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Bare identifier filter.
    #[must_use]
    pub const fn identifier(id: ObjectId) -> Self {
        Self::Identifier(id)
    }

    /// Reference-with-identifier filter.
    #[must_use]
    pub fn reference<T: Identified + 'static>(object: Arc<T>) -> Self {
        Self::Reference(object)
    }

    /// Wraps a custom adapter.
    #[must_use]
    pub fn custom<T: FilterMatch>(adapter: T) -> Self {
        Self::Custom(Arc::new(adapter))
    }

    /// Builds a regular-expression filter, see [`PatternFilter`].
    pub fn pattern(pattern: &str) -> Result<Self, crate::error::ValidationError> {
        Ok(Self::custom(PatternFilter::new(pattern)?))
    }

    /// The matching primitive.
    ///
    /// `self` is the outgoing filter and `other` the stored one. Values of
    /// different variants never match, except that an identifier and a
    /// reference match when the reference carries that identifier. Nested
    /// sequences and mappings are compared structurally.
    #[must_use]
    pub fn matches(&self, other: &Filter) -> bool {
        match (self, other) {
            (Self::Custom(custom), _) => custom.matches(other),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y))
            }
            (Self::Mapping(a), Self::Mapping(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.matches(y)))
            }
            (Self::Identifier(a), Self::Identifier(b)) => a == b,
            (Self::Reference(a), Self::Reference(b)) => a.object_id() == b.object_id(),
            (Self::Identifier(id), Self::Reference(object))
            | (Self::Reference(object), Self::Identifier(id)) => object.object_id() == id,
            _ => false,
        }
    }

    /// Downcasts a custom filter to its concrete adapter type.
    #[must_use]
    pub fn as_custom<T: FilterMatch>(&self) -> Option<&T> {
        match self {
            Self::Custom(custom) => custom.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Returns the text content of a text filter.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the identifier of an identifier or reference filter.
    #[must_use]
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Identifier(id) => Some(id),
            Self::Reference(object) => Some(object.object_id()),
            _ => None,
        }
    }

    /// Returns a human-readable variant name.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Identifier(_) => "identifier",
            Self::Reference(_) => "reference",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Identifier(id) => write!(f, "id:{id}"),
            Self::Reference(object) => write!(f, "ref:{}", object.object_id()),
            Self::Custom(custom) => write!(f, "custom:{custom:?}"),
        }
    }
}

impl From<&str> for Filter {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Filter {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<ObjectId> for Filter {
    fn from(v: ObjectId) -> Self {
        Self::Identifier(v)
    }
}

impl<T: Into<Filter>> From<Vec<T>> for Filter {
    fn from(v: Vec<T>) -> Self {
        Self::sequence(v)
    }
}

impl<K: Into<String>, V: Into<Filter>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::mapping(iter)
    }
}

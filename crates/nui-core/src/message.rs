#![forbid(unsafe_code)]

//! Type-erased messages and taggers.
//!
//! Views are written against a concrete message type (`Node<Msg>`), but a
//! single tree mixes many of them: every [`map`](crate::node::map) boundary
//! switches from a child's message type to its parent's. The renderer and the
//! event scopes therefore move messages around as [`AnyMessage`] and rely on
//! [`Tagger`] to restore the static type at each boundary.
//!
//! The typed constructors guarantee that a tagger only ever receives the
//! message type it was built for. A mismatch is still reported as a value
//! ([`MessageMismatch`]) rather than a panic.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

/// A message whose concrete type has been erased.
pub type AnyMessage = Box<dyn Any>;

/// A tagger received a message of a type it was not built for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tagger expected a `{expected}` message")]
pub struct MessageMismatch {
    /// Type name the tagger was built to accept.
    pub expected: &'static str,
}

impl MessageMismatch {
    /// Mismatch for a tagger or sink expecting `T`.
    pub fn expecting<T: 'static>() -> Self {
        Self {
            expected: type_name::<T>(),
        }
    }
}

type TaggerFn = dyn Fn(AnyMessage) -> Result<AnyMessage, MessageMismatch>;

/// A function translating a subtree's message into its parent's message.
///
/// Cloning is cheap (reference counted); clones share the same function.
#[derive(Clone)]
pub struct Tagger {
    func: Rc<TaggerFn>,
    input: &'static str,
    output: &'static str,
}

impl Tagger {
    /// Wrap `f: A -> B` as an erased tagger.
    pub fn new<A, B, F>(f: F) -> Self
    where
        A: 'static,
        B: 'static,
        F: Fn(A) -> B + 'static,
    {
        Self {
            func: Rc::new(move |msg: AnyMessage| match msg.downcast::<A>() {
                Ok(inner) => Ok(Box::new(f(*inner)) as AnyMessage),
                Err(_) => Err(MessageMismatch::expecting::<A>()),
            }),
            input: type_name::<A>(),
            output: type_name::<B>(),
        }
    }

    /// Apply the tagger to an erased message.
    pub fn apply(&self, msg: AnyMessage) -> Result<AnyMessage, MessageMismatch> {
        (self.func)(msg)
    }

    /// Type name of the message this tagger accepts.
    pub fn input_type(&self) -> &'static str {
        self.input
    }

    /// Type name of the message this tagger produces.
    pub fn output_type(&self) -> &'static str {
        self.output
    }

    /// Whether two taggers share the same underlying function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Tagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tagger({} -> {})", self.input, self.output)
    }
}

/// Erase a typed message.
#[inline]
pub fn erase<M: 'static>(msg: M) -> AnyMessage {
    Box::new(msg)
}

/// Recover a typed message from an erased one.
pub fn downcast<M: 'static>(msg: AnyMessage) -> Result<M, MessageMismatch> {
    msg.downcast::<M>()
        .map(|boxed| *boxed)
        .map_err(|_| MessageMismatch::expecting::<M>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Child {
        Clicked,
    }

    #[derive(Debug, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn tagger_maps_typed_message() {
        let tagger = Tagger::new(Parent::Child);
        let out = tagger.apply(erase(Child::Clicked)).expect("tagger applies");
        assert_eq!(
            downcast::<Parent>(out).expect("parent message"),
            Parent::Child(Child::Clicked)
        );
    }

    #[test]
    fn tagger_rejects_foreign_message() {
        let tagger = Tagger::new(Parent::Child);
        let err = tagger.apply(erase(42_u32)).unwrap_err();
        assert!(err.expected.ends_with("Child"), "{err}");
    }

    #[test]
    fn tagger_reports_types() {
        let tagger = Tagger::new(|n: u8| u32::from(n));
        assert_eq!(tagger.input_type(), "u8");
        assert_eq!(tagger.output_type(), "u32");
        assert!(format!("{tagger:?}").contains("u8 -> u32"));
    }

    #[test]
    fn clones_share_function() {
        let a = Tagger::new(|n: i32| n + 1);
        let b = a.clone();
        let c = Tagger::new(|n: i32| n + 1);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn downcast_reports_expected_type() {
        let err = downcast::<String>(erase(1_i64)).unwrap_err();
        assert_eq!(err, MessageMismatch::expecting::<String>());
    }
}

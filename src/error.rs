//! Errors from name-based access. Everything checked by the compiler stays a compile error; these
//! are the failures that can only be seen once a member is chosen by a runtime string.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error("`{type_name}` has no reflected member named `{name}`")]
    MemberNotFound { type_name: &'static str, name: String },

    #[error("`{member}` takes arguments `{expected}`, not `{found}`")]
    ArgumentMismatch {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{member}` returns `{expected}`, not `{found}`")]
    ReturnTypeMismatch {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{member}` takes `{receiver}` and cannot be called through a shared reference")]
    ReceiverMismatch { member: String, receiver: &'static str },

    #[error("field `{member}` has type `{expected}`, not `{found}`")]
    FieldTypeMismatch {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{member}` has type `{value_type}`, which is not `Clone`")]
    NotCloneable { member: String, value_type: &'static str },

    #[error("no registered type is named `{0}`")]
    NotRegistered(String),
}

pub type Result<T> = std::result::Result<T, ReflectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_member() {
        let error = ReflectError::MemberNotFound {
            type_name: "Point",
            name: "z".to_string(),
        };
        assert_eq!(error.to_string(), "`Point` has no reflected member named `z`");

        let error = ReflectError::ReceiverMismatch {
            member: "Point::scale".to_string(),
            receiver: "&mut self",
        };
        assert!(error.to_string().contains("&mut self"));
    }
}

//! The crate's [`Error`] type.
use thiserror::Error;

/// Errors from decoding, encoding, and working with DBN.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading from the byte source or writing to the sink failed. Passed through
    /// as is; retrying is up to the caller.
    #[error("IO error: {source:?} while {context}")]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// What was being read or written.
        context: String,
    },
    /// The input isn't valid DBN. Retrying won't help.
    #[error("decoding error: {0}")]
    Decode(String),
    /// The value can't be represented in DBN.
    #[error("encoding error: {0}")]
    Encode(String),
    /// A value couldn't be converted to the requested type, e.g. a [`RecordRef`]
    /// read as the wrong record type or an unknown enum discriminant.
    ///
    /// [`RecordRef`]: crate::RecordRef
    #[error("couldn't convert {input} to {desired_type}")]
    Conversion {
        /// Description of the value.
        input: String,
        /// Name of the requested type.
        desired_type: &'static str,
    },
    /// A fixed-width string field isn't valid UTF-8.
    #[error("UTF-8 error: {source:?} while {context}")]
    Utf8 {
        /// The underlying UTF-8 error.
        #[source]
        source: std::str::Utf8Error,
        /// Which field was being read.
        context: String,
    },
    /// An argument was out of range.
    #[error("bad argument {param_name}: {desc}")]
    BadArgument {
        /// The offending parameter.
        param_name: String,
        /// Why it was rejected.
        desc: String,
    },
}

/// Shorthand for a [`std::result::Result`] with [`Error`](crate::Error).
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates an [`Error::Io`] with `context` describing the operation.
    pub fn io(error: std::io::Error, context: impl ToString) -> Self {
        Self::Io {
            source: error,
            context: context.to_string(),
        }
    }

    /// Creates an [`Error::Decode`].
    pub fn decode(msg: impl ToString) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Creates an [`Error::Encode`].
    pub fn encode(msg: impl ToString) -> Self {
        Self::Encode(msg.to_string())
    }

    /// Creates an [`Error::Conversion`] for a failed conversion of `input` to `T`.
    pub fn conversion<T>(input: impl ToString) -> Self {
        Self::Conversion {
            input: input.to_string(),
            desired_type: std::any::type_name::<T>(),
        }
    }

    /// Creates an [`Error::Utf8`].
    pub fn utf8(error: std::str::Utf8Error, context: impl ToString) -> Self {
        Self::Utf8 {
            source: error,
            context: context.to_string(),
        }
    }

    /// Creates an [`Error::BadArgument`].
    pub fn bad_arg(param_name: impl ToString, desc: impl ToString) -> Self {
        Self::BadArgument {
            param_name: param_name.to_string(),
            desc: desc.to_string(),
        }
    }
}

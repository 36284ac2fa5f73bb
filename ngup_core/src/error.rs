use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum NgupError {
	#[error(transparent)]
	#[diagnostic(code(ngup::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(ngup::config_parse),
		help("check that ngup.toml is valid TOML with [rules], [include] and/or [exclude] sections")
	)]
	ConfigParse(String),

	#[error("offset {offset} outside of range [0, {length}]")]
	#[diagnostic(code(ngup::offset_out_of_bounds))]
	OffsetOutOfBounds { offset: usize, length: usize },

	#[error("offset {offset} falls inside a multi-byte character")]
	#[diagnostic(code(ngup::offset_not_char_boundary))]
	OffsetNotCharBoundary { offset: usize },

	#[error("unknown value transform: `{0}`")]
	#[diagnostic(
		code(ngup::unknown_value_transform),
		help("available value transforms: hidden-negation, repeat-to-for")
	)]
	UnknownValueTransform(String),

	#[error("unknown pipe transform: `{0}`")]
	#[diagnostic(
		code(ngup::unknown_pipe_transform),
		help("available pipe transforms: limit-to-slice, currency")
	)]
	UnknownPipeTransform(String),

	#[error("unknown expression transform: `{0}`")]
	#[diagnostic(
		code(ngup::unknown_expression_transform),
		help("available expression transforms: strip-vm-alias")
	)]
	UnknownExpressionTransform(String),

	#[error("invalid file pattern `{pattern}`: {reason}")]
	#[diagnostic(code(ngup::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },
}

pub type NgupResult<T> = Result<T, NgupError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;

use std::{
	io,
	path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while assembling a certificate bundle.
///
/// Every failure that concerns a file carries the path of that file so the
/// caller can tell the user exactly which input or output was at fault.
#[derive(Debug, Error)]
pub enum Error {
	/// The `bundle` command was not given exactly the positional arguments it needs.
	#[error("wrong number of arguments: expected {expected}, got {actual}")]
	ArgumentCount {
		/// Number of arguments the command takes.
		expected: usize,
		/// Number of arguments it was given.
		actual: usize,
	},
	/// Reading or writing a file failed.
	#[error("{}: {source}", .path.display())]
	File {
		/// The file that could not be read or written.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: io::Error,
	},
	/// A file did not contain a decodable PEM block.
	#[error("could not parse certificate file '{}': {source}", .path.display())]
	Parse {
		/// The file whose contents could not be decoded.
		path: PathBuf,
		/// Why the PEM decoder rejected it.
		#[source]
		source: pem::PemError,
	},
}

impl Error {
	pub(crate) fn file(path: &Path, source: io::Error) -> Self {
		Error::File {
			path: path.to_path_buf(),
			source,
		}
	}

	pub(crate) fn parse(path: &Path, source: pem::PemError) -> Self {
		Error::Parse {
			path: path.to_path_buf(),
			source,
		}
	}

	/// The file this error is about, if any.
	pub fn path(&self) -> Option<&Path> {
		match self {
			Error::ArgumentCount { .. } => None,
			Error::File { path, .. } | Error::Parse { path, .. } => Some(path),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn argument_count_message() {
		let few = Error::ArgumentCount {
			expected: 3,
			actual: 1,
		};
		assert_eq!(
			few.to_string(),
			"wrong number of arguments: expected 3, got 1"
		);
		let many = Error::ArgumentCount {
			expected: 3,
			actual: 4,
		};
		assert_eq!(
			many.to_string(),
			"wrong number of arguments: expected 3, got 4"
		);
		assert!(many.path().is_none());
	}

	#[test]
	fn file_error_names_path() {
		let err = Error::file(
			Path::new("missing.crt"),
			io::Error::new(io::ErrorKind::NotFound, "not found"),
		);
		assert_eq!(err.path(), Some(Path::new("missing.crt")));
		assert!(err.to_string().starts_with("missing.crt: "));
	}

	#[test]
	fn parse_error_names_path() {
		let source = pem::parse("not a certificate").unwrap_err();
		let err = Error::parse(Path::new("garbage.crt"), source);
		assert_eq!(err.path(), Some(Path::new("garbage.crt")));
		assert!(err
			.to_string()
			.starts_with("could not parse certificate file 'garbage.crt'"));
	}
}

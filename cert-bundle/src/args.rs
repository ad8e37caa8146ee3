//! Command Line argument parsing
#![allow(missing_docs)]

use bpaf::Bpaf;

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version)]
/// Certificate tooling
pub enum Options {
	/// Create, inspect and combine X.509 certificates
	#[bpaf(command)]
	Certificate(#[bpaf(external(certificate_command))] CertificateCommand),
}

#[derive(Clone, Debug, Bpaf)]
pub enum CertificateCommand {
	/// Bundle a certificate with the intermediate certificate needed for
	/// certificate path validation.
	///
	/// Writes <crt_file> followed by <ca> to <bundle_file>, which is created
	/// readable and writable by its owner only. Only the first PEM block of
	/// each input is used.
	///
	/// Returns 0 on success and >0 if any error occurs.
	///
	/// Example: cert-bundle certificate bundle foo.crt intermediate-ca.crt foo-bundle.crt
	#[bpaf(command)]
	Bundle {
		/// <crt_file> <ca> <bundle_file>: the leaf certificate, the certificate
		/// of the CA that issued it, and the path to write the bundle to
		#[bpaf(positional::<String>("FILE"), many)]
		files: Vec<String>,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Options {
		options().run_inner(args).unwrap()
	}

	#[test]
	fn bundle_collects_positionals() {
		let Options::Certificate(CertificateCommand::Bundle { files }) =
			parse(&["certificate", "bundle", "foo.crt", "ca.crt", "foo-bundle.crt"]);
		assert_eq!(files, vec!["foo.crt", "ca.crt", "foo-bundle.crt"]);
	}

	#[test]
	fn bundle_leaves_count_check_to_library() {
		let Options::Certificate(CertificateCommand::Bundle { files }) =
			parse(&["certificate", "bundle", "only-one.crt"]);
		assert_eq!(files.len(), 1);
		let Options::Certificate(CertificateCommand::Bundle { files }) =
			parse(&["certificate", "bundle"]);
		assert!(files.is_empty());
	}

	#[test]
	fn bundle_requires_certificate_group() {
		assert!(options()
			.run_inner(&["bundle", "a", "b", "c"][..])
			.is_err());
	}

	#[test]
	fn check_invariants() {
		options().check_invariants(false);
	}
}

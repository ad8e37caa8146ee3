use std::{
	fs::{self, OpenOptions},
	io::Write,
	path::{Path, PathBuf},
};

use pem::Pem;
use tracing::{debug, info};

use crate::{Error, Result};

/// Bundles are always written with LF endings and 64 column base64 lines,
/// whatever the inputs looked like.
const ENCODE_CONFIG: pem::EncodeConfig =
	pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF);

const BEGIN_MARKER: &[u8] = b"-----BEGIN ";

const PROC_TYPE: &str = "Proc-Type";

/// Number of positional arguments `bundle` takes.
pub const ARGUMENT_COUNT: usize = 3;

/// Permission bits of the written bundle: owner read/write.
#[cfg(unix)]
const BUNDLE_MODE: u32 = 0o600;

/// The three paths the `bundle` command operates on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleArgs {
	/// Leaf (end-entity) certificate file.
	pub leaf: PathBuf,
	/// Issuing CA certificate file.
	pub issuer: PathBuf,
	/// Where the bundle is written.
	pub output: PathBuf,
}

impl BundleArgs {
	/// Validate raw positional arguments, in `<crt_file> <ca> <bundle_file>` order.
	/// # Example
	/// ```
	/// # use cert_bundle::BundleArgs;
	/// let args = BundleArgs::from_positional(&["foo.crt", "ca.crt", "foo-bundle.crt"]).unwrap();
	/// assert_eq!(args.issuer, std::path::PathBuf::from("ca.crt"));
	/// ```
	pub fn from_positional<S: AsRef<str>>(args: &[S]) -> Result<Self> {
		match args {
			[leaf, issuer, output] => Ok(Self {
				leaf: PathBuf::from(leaf.as_ref()),
				issuer: PathBuf::from(issuer.as_ref()),
				output: PathBuf::from(output.as_ref()),
			}),
			_ => Err(Error::ArgumentCount {
				expected: ARGUMENT_COUNT,
				actual: args.len(),
			}),
		}
	}
}

/// A leaf certificate block followed by the block of its issuer.
#[derive(Clone, Debug, PartialEq)]
pub struct Bundle {
	leaf: Pem,
	issuer: Pem,
}

impl Bundle {
	/// Pair two already decoded blocks.
	pub fn new(leaf: Pem, issuer: Pem) -> Self {
		Self { leaf, issuer }
	}

	/// Load the first PEM block of `leaf` and then of `issuer`.
	///
	/// Stops at the first failure, so `issuer` is never opened when `leaf`
	/// cannot be read or decoded.
	pub fn from_files(leaf: &Path, issuer: &Path) -> Result<Self> {
		let leaf = read_first_block(leaf)?;
		let issuer = read_first_block(issuer)?;
		Ok(Self { leaf, issuer })
	}

	/// Return the leaf block.
	pub fn leaf(&self) -> &Pem {
		&self.leaf
	}

	/// Return the issuer block.
	pub fn issuer(&self) -> &Pem {
		&self.issuer
	}

	/// Canonical PEM encoding of the leaf followed by the issuer.
	pub fn to_pem(&self) -> String {
		let mut out = encode_block(&self.leaf);
		out.push_str(&encode_block(&self.issuer));
		out
	}

	/// Create or truncate `path` and write the bundle into it, readable
	/// and writable by the owner only.
	///
	/// An existing file is only truncated once its permissions have been
	/// restricted. A failure while writing may leave a truncated file behind.
	pub fn write(&self, path: &Path) -> Result<()> {
		write_restricted(path, self.to_pem().as_bytes()).map_err(|e| Error::file(path, e))?;
		debug!(path = %path.display(), "wrote bundle");
		Ok(())
	}
}

/// Read `path` and decode the first PEM block in it. Anything after that
/// block is ignored.
pub fn read_first_block(path: &Path) -> Result<Pem> {
	let bytes = fs::read(path).map_err(|e| Error::file(path, e))?;
	debug!(path = %path.display(), len = bytes.len(), "read certificate file");
	let block = decode_first_block(&bytes).map_err(|e| Error::parse(path, e))?;
	debug!(path = %path.display(), tag = block.tag(), "decoded PEM block");
	Ok(block)
}

/// Return the first block that decodes, trying each `-----BEGIN ` that
/// starts a line. Malformed blocks before it are skipped; if none decodes
/// the error of the first attempt is returned.
fn decode_first_block(bytes: &[u8]) -> std::result::Result<Pem, pem::PemError> {
	let mut first_err = None;
	for start in line_starts(bytes).filter(|&i| bytes[i..].starts_with(BEGIN_MARKER)) {
		match pem::parse(&bytes[start..]) {
			Ok(block) => return Ok(block),
			Err(e) => {
				debug!(offset = start, error = %e, "skipping malformed PEM block");
				first_err.get_or_insert(e);
			},
		}
	}
	Err(first_err.unwrap_or(pem::PemError::MissingBeginTag))
}

/// Encode `block` with its headers in canonical order: `Proc-Type` first,
/// then the other keys sorted, each key once with the last value given.
fn encode_block(block: &Pem) -> String {
	let headers = sorted_headers(block);
	if headers.is_empty() {
		return pem::encode_config(block, ENCODE_CONFIG);
	}
	let bare = pem::encode_config(&Pem::new(block.tag(), block.contents()), ENCODE_CONFIG);
	let (begin, body) = bare.split_at(bare.find('\n').map_or(bare.len(), |i| i + 1));
	let mut out = begin.to_string();
	for (key, value) in headers {
		out.push_str(&format!("{key}: {value}\n"));
	}
	out.push('\n');
	out.push_str(body);
	out
}

fn sorted_headers(block: &Pem) -> Vec<(&str, &str)> {
	let headers = block.headers();
	let mut keys: Vec<&str> = headers.iter().map(|(key, _)| key).collect();
	keys.sort_unstable_by_key(|&key| (key != PROC_TYPE, key));
	keys.dedup();
	keys.into_iter()
		.filter_map(|key| Some((key, headers.get(key)?)))
		.collect()
}

fn line_starts(bytes: &[u8]) -> impl Iterator<Item = usize> + '_ {
	std::iter::once(0).chain(
		bytes
			.iter()
			.enumerate()
			.filter(|(_, b)| **b == b'\n')
			.map(|(i, _)| i + 1),
	)
}

/// Run `bundle <crt_file> <ca> <bundle_file>`.
///
/// The argument count is checked before any file is touched.
pub fn run<S: AsRef<str>>(args: &[S]) -> Result<()> {
	let args = BundleArgs::from_positional(args)?;
	Bundle::from_files(&args.leaf, &args.issuer)?.write(&args.output)?;
	info!(
		leaf = %args.leaf.display(),
		issuer = %args.issuer.display(),
		output = %args.output.display(),
		"certificate bundle created"
	);
	Ok(())
}

fn write_restricted(path: &Path, contents: &[u8]) -> std::io::Result<()> {
	let mut options = OpenOptions::new();
	options.write(true).create(true).truncate(false);
	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;
		options.mode(BUNDLE_MODE);
	}
	let mut file = options.open(path)?;
	// `mode` only applies when the file is created
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		file.set_permissions(PermissionsExt::from_mode(BUNDLE_MODE))?;
	}
	file.set_len(0)?;
	file.write_all(contents)
}

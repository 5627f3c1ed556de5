//! Extraction of error norms from semi-structured text.
//!
//! Each textual contract is implemented as a [`ResultParser`] carrying its own
//! [`ParserVersion`], so that a change in a collaborator's output format shows
//! up as a new parser rather than a silent change in behavior. Parsers only
//! locate and read numbers; validation of the values happens when they are
//! turned into [`GridSample`][crate::sample::GridSample]s.
//!
//! ```
//! use convord::parse::{ ResultParser, ResultsLineParser };
//!
//! let out = "step 100\nRESULTS: Minkowski L2=1.5e-3 Linf=3.0e-3\ndone\n";
//! let pair = ResultsLineParser.extract(out, "Minkowski").unwrap();
//! assert_eq!(pair.l2, 1.5e-3);
//! assert_eq!(pair.linf, 3.0e-3);
//! ```

use std::fmt;
use regex::Regex;
use crate::error::ParseError;

pub type ParseResult<T> = Result<T, ParseError>;

// a decimal number with optional sign and exponent
const FLOAT: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

/// Version of a textual contract understood by a [`ResultParser`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParserVersion(pub u32);

impl fmt::Display for ParserVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The (L2, L∞) pair reported for one test case.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NormPair {
    pub l2: f64,
    pub linf: f64,
}

/// A versioned extractor of [`NormPair`]s from text.
pub trait ResultParser {
    /// Short name of the textual contract, used in error messages.
    fn format(&self) -> &'static str;

    /// Version of the textual contract.
    fn version(&self) -> ParserVersion;

    /// Locate and read the norms reported for `test` in `text`.
    ///
    /// If several lines match, the first one wins.
    fn extract(&self, text: &str, test: &str) -> ParseResult<NormPair>;
}

fn read_float(test: &str, text: &str) -> ParseResult<f64> {
    text.parse()
        .map_err(|_| ParseError::BadNumber {
            test: test.to_string(),
            text: text.to_string(),
        })
}

fn extract_with<P>(parser: &P, pattern: &str, text: &str, test: &str)
    -> ParseResult<NormPair>
where P: ResultParser + ?Sized
{
    let re = Regex::new(pattern)?;
    let caps
        = re.captures(text)
        .ok_or_else(|| ParseError::NotFound {
            test: test.to_string(),
            format: parser.format(),
            version: parser.version(),
        })?;
    Ok(NormPair {
        l2: read_float(test, &caps["l2"])?,
        linf: read_float(test, &caps["linf"])?,
    })
}

/// Reads rows of a typeset results table, `<TestName> & <L2> & <Linf>`.
///
/// The test name must open its row and the whole row must sit on one line, so
/// `Minkowski` matches neither `PerturbedMinkowski` nor `Non-Minkowski`.
#[derive(Copy, Clone, Debug, Default)]
pub struct TableRowParser;

impl ResultParser for TableRowParser {
    fn format(&self) -> &'static str { "table-row" }

    fn version(&self) -> ParserVersion { ParserVersion(1) }

    fn extract(&self, text: &str, test: &str) -> ParseResult<NormPair> {
        let pattern = format!(
            r"(?m)^[ \t]*{}[ \t]*&[ \t]*(?P<l2>{FLOAT})[ \t]*&[ \t]*(?P<linf>{FLOAT})",
            regex::escape(test),
        );
        extract_with(self, &pattern, text, test)
    }
}

/// Reads solver output lines, `RESULTS: <TestName> L2=<float> Linf=<float>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ResultsLineParser;

impl ResultParser for ResultsLineParser {
    fn format(&self) -> &'static str { "RESULTS-line" }

    fn version(&self) -> ParserVersion { ParserVersion(1) }

    fn extract(&self, text: &str, test: &str) -> ParseResult<NormPair> {
        let pattern = format!(
            r"(?m)^[ \t]*RESULTS:[ \t]+{}[ \t]+L2=(?P<l2>{FLOAT})[ \t]+Linf=(?P<linf>{FLOAT})[ \t\r]*$",
            regex::escape(test),
        );
        extract_with(self, &pattern, text, test)
    }
}

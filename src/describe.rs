//! Parsing of `git describe` output into structured version fields.
//!
//! Accepted shapes:
//! - Tag-rooted: `v1.2.3`, `1.4`, `2.4.0~rc1`, `v1.2.3-2` (packaging
//!   revision), `v1.2.3-7-gabcd1234` (commits since tag plus hash),
//!   `v1.2.3-2-7-gabcd1234` (both)
//! - Bare commit: `abcd1234`, produced when no tag is reachable
//! - Either shape with a trailing `-dirty` marker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("malformed describe output: {0:?}")]
    Malformed(String),
}

/// Fields parsed from a single describe string.
///
/// A successful parse is either tag-rooted (`major`/`minor` present) or a
/// bare commit (`sha` present, nothing else). `commits` and `sha` are set
/// together or not at all; `revision` is independent of both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description {
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub patch: Option<u32>,
    /// Free text glued directly onto the numeric version, e.g. `~rc1`.
    pub extra: Option<String>,
    /// Packaging revision (a `-N` group with nothing hash-like after it).
    pub revision: Option<u32>,
    /// Commits since the nearest tag.
    pub commits: Option<u32>,
    /// Lowercase hex commit id, at least 4 characters.
    pub sha: Option<String>,
    pub dirty: bool,
}

impl Description {
    /// Parse one trimmed line of `git describe` output.
    ///
    /// The whole input must be consumed; anything left over is a
    /// [`DescribeError::Malformed`] carrying the offending string.
    pub fn parse(input: &str) -> Result<Self, DescribeError> {
        // The dirty marker belongs to neither grammar branch, so it is
        // stripped and recorded before either branch runs.
        let (body, dirty) = match input.strip_suffix("-dirty") {
            Some(stripped) => (stripped, true),
            None => (input, false),
        };

        let parsed = parse_tag_rooted(body).or_else(|| parse_bare_commit(body));
        match parsed {
            Some(mut desc) => {
                desc.dirty = dirty;
                Ok(desc)
            }
            None => Err(DescribeError::Malformed(input.to_string())),
        }
    }

    /// `major.minor` or `major.minor.patch`. `None` for bare commits.
    pub fn full(&self) -> Option<String> {
        let (major, minor) = (self.major?, self.minor?);
        Some(match self.patch {
            Some(patch) => format!("{major}.{minor}.{patch}"),
            None => format!("{major}.{minor}"),
        })
    }

    /// [`full`](Self::full) with `extra` appended, if any.
    pub fn full_extra(&self) -> Option<String> {
        let full = self.full()?;
        Some(match &self.extra {
            Some(extra) => format!("{full}{extra}"),
            None => full,
        })
    }

    /// The most specific identifier available: `sha` if present, else
    /// the full version string.
    pub fn any(&self) -> String {
        match &self.sha {
            Some(sha) => sha.clone(),
            None => self.full().unwrap_or_default(),
        }
    }
}

/// Byte cursor with explicit save/restore for backtracking.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn done(&self) -> bool {
        self.pos == self.input.len()
    }

    fn eat(&mut self, lit: &str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Consume a run of ASCII digits and parse it.
    fn digits(&mut self) -> Option<u32> {
        let run = self
            .rest()
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest().len());
        if run == 0 {
            return None;
        }
        let value = self.rest()[..run].parse().ok()?;
        self.pos += run;
        Some(value)
    }

    /// Consume a run of lowercase hex characters.
    fn hex_run(&mut self) -> Option<&'a str> {
        let run = self
            .rest()
            .find(|c: char| !is_lower_hex(c))
            .unwrap_or(self.rest().len());
        if run == 0 {
            return None;
        }
        let hex = &self.rest()[..run];
        self.pos += run;
        Some(hex)
    }
}

fn is_lower_hex(c: char) -> bool {
    c.is_ascii_digit() || ('a'..='f').contains(&c)
}

fn parse_tag_rooted(body: &str) -> Option<Description> {
    let mut cur = Cursor::new(body);

    // Single-letter tag prefix, conventionally `v`, discarded.
    if body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        cur.pos = 1;
    }

    let major = cur.digits()?;
    if !cur.eat(".") {
        return None;
    }
    let minor = cur.digits()?;

    // Optional `.patch`; a dot not followed by digits is left for `extra`.
    let save = cur.pos;
    let patch = if cur.eat(".") {
        match cur.digits() {
            Some(patch) => Some(patch),
            None => {
                cur.pos = save;
                None
            }
        }
    } else {
        None
    };

    // `extra` runs up to the next separator (or the end). It never
    // contains `-` or whitespace, so the facet groups stay unambiguous
    // and junk after the version still fails the full-consumption rule.
    let extra_start = cur.pos;
    let extra_len = cur
        .rest()
        .find(|c: char| c == '-' || c.is_whitespace())
        .unwrap_or(cur.rest().len());
    cur.pos += extra_len;
    let extra = (extra_len > 0).then(|| body[extra_start..cur.pos].to_string());

    let (revision, commits, sha) = parse_facets(&mut cur)?;

    Some(Description {
        major: Some(major),
        minor: Some(minor),
        patch,
        extra,
        revision,
        commits,
        sha,
        ..Description::default()
    })
}

/// Parse the optional `-revision` and `-commits-gsha` groups, resolving
/// the ambiguity between them.
///
/// A `-N` group is ambiguous: `N` is a packaging revision in `v1.2-3` but
/// the commit count in `v1.2-3-gabcd1234`. The revision reading is tried
/// first and kept only if the remaining input still parses to the end;
/// otherwise the same digit run is re-read as the commits facet. This is
/// what makes `v1.2.3-9-7-gabcd1234` come out as revision 9 + 7 commits.
fn parse_facets(cur: &mut Cursor<'_>) -> Option<(Option<u32>, Option<u32>, Option<String>)> {
    let start = cur.pos;

    if cur.eat("-") {
        if let Some(revision) = cur.digits() {
            let after_revision = cur.pos;
            if let Some((commits, sha)) = commits_and_sha(cur) {
                if cur.done() {
                    return Some((Some(revision), Some(commits), Some(sha)));
                }
            }
            cur.pos = after_revision;
            if cur.done() {
                return Some((Some(revision), None, None));
            }
        }
    }

    // The digit run was not a revision after all; retry it as commits.
    cur.pos = start;
    if let Some((commits, sha)) = commits_and_sha(cur) {
        if cur.done() {
            return Some((None, Some(commits), Some(sha)));
        }
    }

    cur.pos = start;
    cur.done().then_some((None, None, None))
}

/// `-<commits>-g<sha>` with sha at least 4 lowercase hex characters.
fn commits_and_sha(cur: &mut Cursor<'_>) -> Option<(u32, String)> {
    let save = cur.pos;
    let attempt = (|| {
        if !cur.eat("-") {
            return None;
        }
        let commits = cur.digits()?;
        if !cur.eat("-g") {
            return None;
        }
        let sha = cur.hex_run()?;
        (sha.len() >= 4).then(|| (commits, sha.to_string()))
    })();
    if attempt.is_none() {
        cur.pos = save;
    }
    attempt
}

fn parse_bare_commit(body: &str) -> Option<Description> {
    let is_sha = body.len() >= 4 && body.chars().all(is_lower_hex);
    is_sha.then(|| Description {
        sha: Some(body.to_string()),
        ..Description::default()
    })
}

//! Syntax definitions and the row highlighter.
//!
//! Highlighting is row-at-a-time: `highlight_row` classifies one row's render
//! bytes given only the predecessor row's trailing multi-line-comment flag and
//! returns the new trailing flag. The row store owns the forward cascade; this
//! crate stays pure so the classifier can be tested byte-for-byte without a
//! document around it.

use bitflags::bitflags;

bitflags! {
    /// Per-filetype feature gates for the classifier passes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS = 0b0000_0001;
        const STRINGS = 0b0000_0010;
    }
}

/// Highlight class of a single render cell. Maps 1:1 to a VT100 colour code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Highlight {
    #[default]
    Normal,
    Comment,
    MlComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Match,
}

impl Highlight {
    /// SGR foreground colour code for this class. `Normal` cells are emitted
    /// with the default foreground (SGR 39) by the renderer; 37 is only the
    /// nominal fallback.
    pub fn color(self) -> u8 {
        match self {
            Highlight::Comment | Highlight::MlComment => 36,
            Highlight::Keyword1 => 33,
            Highlight::Keyword2 => 34,
            Highlight::String => 35,
            Highlight::Number => 31,
            Highlight::Match => 34,
            Highlight::Normal => 37,
        }
    }
}

/// A compiled-in filetype definition.
///
/// `patterns` entries starting with `.` match the filename's final extension
/// exactly; any other entry matches as a substring of the filename. Keywords
/// carrying a trailing `|` belong to the secondary class (types); the marker
/// is not part of the match.
pub struct SyntaxDef {
    pub filetype: &'static str,
    pub patterns: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub singleline_comment_start: &'static str,
    pub multiline_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
}

pub static SYNTAX_TABLE: &[SyntaxDef] = &[
    SyntaxDef {
        filetype: "c",
        patterns: &[".c", ".h", ".cpp"],
        keywords: &[
            "switch", "if", "while", "for", "break", "continue", "return", "else", "struct",
            "union", "typedef", "static", "enum", "class", "case", "int|", "long|", "double|",
            "float|", "char|", "unsigned|", "signed|", "void|",
        ],
        singleline_comment_start: "//",
        multiline_comment: Some(("/*", "*/")),
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
    SyntaxDef {
        filetype: "rust",
        patterns: &[".rs"],
        keywords: &[
            "as", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false",
            "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
            "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
            "unsafe", "use", "where", "while", "async", "await", "bool|", "char|", "str|",
            "String|", "u8|", "u16|", "u32|", "u64|", "u128|", "usize|", "i8|", "i16|", "i32|",
            "i64|", "i128|", "isize|", "f32|", "f64|",
        ],
        singleline_comment_start: "//",
        multiline_comment: Some(("/*", "*/")),
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
];

/// Separator set: whitespace, NUL, and the classic punctuation bytes. A
/// position past the end of the row also counts as a separator boundary.
pub fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'\0' || b",.()+-/*=~%<>[];".contains(&b)
}

/// Select the syntax definition for a filename, walking the table in order.
/// First matching pattern wins.
pub fn select_syntax(filename: &str) -> Option<&'static SyntaxDef> {
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext);
    SYNTAX_TABLE.iter().find(|def| {
        def.patterns.iter().any(|pattern| {
            if let Some(ext_pattern) = pattern.strip_prefix('.') {
                extension == Some(ext_pattern)
            } else {
                filename.contains(pattern)
            }
        })
    })
}

/// Classify one row of render bytes.
///
/// `prev_open_comment` is the trailing multi-line-comment flag of the
/// predecessor row (false for the first row). Returns the highlight array
/// (same length as `render`) and this row's trailing flag.
pub fn highlight_row(
    render: &[u8],
    syntax: Option<&SyntaxDef>,
    prev_open_comment: bool,
) -> (Vec<Highlight>, bool) {
    let mut hl = vec![Highlight::Normal; render.len()];
    let Some(syntax) = syntax else {
        return (hl, false);
    };

    let scs = syntax.singleline_comment_start.as_bytes();
    let (mcs, mce) = match syntax.multiline_comment {
        Some((open, close)) => (open.as_bytes(), close.as_bytes()),
        None => (&b""[..], &b""[..]),
    };

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = prev_open_comment;

    let mut i = 0;
    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if !scs.is_empty() && in_string.is_none() && !in_comment && render[i..].starts_with(scs) {
            for cell in &mut hl[i..] {
                *cell = Highlight::Comment;
            }
            break;
        }

        if !mcs.is_empty() && !mce.is_empty() && in_string.is_none() {
            if in_comment {
                if render[i..].starts_with(mce) {
                    for cell in &mut hl[i..i + mce.len()] {
                        *cell = Highlight::MlComment;
                    }
                    i += mce.len();
                    in_comment = false;
                    prev_sep = true;
                } else {
                    hl[i] = Highlight::MlComment;
                    i += 1;
                }
                continue;
            } else if render[i..].starts_with(mcs) {
                for cell in &mut hl[i..i + mcs.len()] {
                    *cell = Highlight::MlComment;
                }
                i += mcs.len();
                in_comment = true;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::STRINGS) {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                // A backslash escapes the next byte, which stays string-class.
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::NUMBERS)
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            let mut matched = false;
            for keyword in syntax.keywords {
                let (word, class) = match keyword.strip_suffix('|') {
                    Some(word) => (word.as_bytes(), Highlight::Keyword2),
                    None => (keyword.as_bytes(), Highlight::Keyword1),
                };
                let end = i + word.len();
                let boundary = render.get(end).is_none_or(|&b| is_separator(b));
                if boundary && render[i..].starts_with(word) {
                    for cell in &mut hl[i..end] {
                        *cell = class;
                    }
                    i = end;
                    matched = true;
                    break;
                }
            }
            if matched {
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::model::ZonosError;

/// Location of the espeak-ng binary and its data directory.
#[derive(Debug, Clone, Default)]
pub struct EspeakConfig {
    /// `None` runs `espeak-ng` from PATH.
    pub bin_path: Option<PathBuf>,
    /// `None` uses the data directory compiled into the binary.
    pub data_path: Option<PathBuf>,
}

/// Convert text to token IDs via espeak-ng.
///
/// Characters missing from `symbols` are dropped. Sentence-final punctuation
/// is kept when the symbol table has it, since espeak-ng strips it from IPA
/// output and the model uses it for intonation.
pub fn phonemize(
    text: &str,
    lang: &str,
    symbols: &HashMap<char, i64>,
    espeak: &EspeakConfig,
) -> Result<Vec<i64>, ZonosError> {
    let text = flatten_lines(text);
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let ipa = run_espeak(&text, lang, espeak)?;
    let mut ids = ipa_to_ids(&ipa, symbols);

    if let Some(&id) = terminal_punctuation(&text).and_then(|p| symbols.get(&p)) {
        ids.push(id);
    }

    Ok(ids)
}

/// Collapse all whitespace runs to single spaces.
///
/// espeak-ng answers one IPA line per input line; keeping the text on one
/// line keeps the whole utterance in a single clause sequence.
fn flatten_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn terminal_punctuation(text: &str) -> Option<char> {
    text.trim_end()
        .chars()
        .next_back()
        .filter(|c| matches!(c, '.' | '!' | '?'))
}

fn run_espeak(input: &str, lang: &str, espeak: &EspeakConfig) -> Result<String, ZonosError> {
    let bin = espeak
        .bin_path
        .as_deref()
        .unwrap_or_else(|| Path::new("espeak-ng"));

    let mut command = Command::new(bin);
    command
        .args(["--ipa", "--stdin", "-q", "-v", lang])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(data) = &espeak.data_path {
        command.env("ESPEAK_DATA_PATH", data);
    }

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ZonosError::EspeakNotFound
        } else {
            ZonosError::Io(e)
        }
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        // Without a final newline espeak-ng can drop the last token.
        stdin
            .write_all(newline_terminated(input).as_bytes())
            .map_err(ZonosError::Io)?;
    }

    let output = child.wait_with_output().map_err(ZonosError::Io)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZonosError::PhonemizerFailed(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn newline_terminated(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Map espeak-ng IPA output to token ids, joining output lines with a space.
fn ipa_to_ids(ipa: &str, symbols: &HashMap<char, i64>) -> Vec<i64> {
    let space = symbols.get(&' ').copied();
    let mut ids = Vec::new();
    for line in ipa.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let (Some(space), false) = (space, ids.is_empty()) {
            ids.push(space);
        }
        for ch in line.chars() {
            // '_' marks syllable breaks in espeak-ng IPA
            if ch == '_' {
                continue;
            }
            if let Some(&id) = symbols.get(&ch) {
                ids.push(id);
            }
        }
    }
    ids
}

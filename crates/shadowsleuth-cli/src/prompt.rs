/// Interactive prompts for the processing mode and the baseline copy.
use crate::args::ModeArg;
use anyhow::{bail, Context};
use shadowsleuth_core::SnapshotCatalog;
use std::io::{BufRead, Write};

fn read_answer<R: BufRead>(input: &mut R) -> anyhow::Result<String> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context("reading answer")?;
    if n == 0 {
        bail!("no answer given (end of input)");
    }
    Ok(line.trim().to_string())
}

/// Ask for full (`1`) or compare (`2`) processing.
pub fn prompt_mode<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> anyhow::Result<ModeArg> {
    writeln!(out)?;
    writeln!(out, " 1. Generate report on all files on all available shadow copies")?;
    writeln!(out, " 2. Compare shadow copy contents")?;
    write!(out, "Your selection [1/2]: ")?;
    out.flush()?;

    match read_answer(input)?.as_str() {
        "1" => Ok(ModeArg::Full),
        "2" => Ok(ModeArg::Compare),
        other => bail!("invalid selection {other:?}: expected 1 or 2"),
    }
}

/// Show the numbered copies and ask for the baseline.
///
/// Returns a zero-based catalog position.
pub fn prompt_baseline<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    catalog: &SnapshotCatalog,
) -> anyhow::Result<usize> {
    writeln!(out)?;
    writeln!(
        out,
        "Select your baseline shadow copy. Every file in it is reported, followed by \
         reports of files created after its creation time in each later copy."
    )?;
    writeln!(out)?;
    for (i, snapshot) in catalog.iter().enumerate() {
        writeln!(
            out,
            "[{}] = {} Created at: {}",
            i + 1,
            snapshot.name(),
            snapshot.creation_time
        )?;
    }
    write!(out, "\nYour selection [numerical]: ")?;
    out.flush()?;

    let answer = read_answer(input)?;
    let choice: usize = answer
        .parse()
        .with_context(|| format!("invalid selection {answer:?}: expected a number"))?;
    baseline_index(choice, catalog.len())
}

/// Convert a 1-based choice into a catalog position.
pub fn baseline_index(choice: usize, len: usize) -> anyhow::Result<usize> {
    if choice == 0 || choice > len {
        bail!("shadow copy {choice} does not exist (choose 1 to {len})");
    }
    Ok(choice - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowsleuth_core::Snapshot;
    use std::io::Cursor;

    fn catalog() -> SnapshotCatalog {
        SnapshotCatalog::from_snapshots(
            (1..=3)
                .map(|n| Snapshot {
                    id: format!("{{set-{n}}}"),
                    shadow_copy_id: None,
                    originating_machine: None,
                    creation_time: format!("01/0{n}/2023 10:00:00 AM"),
                    volume_path: format!(r"\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy{n}"),
                    original_volume: None,
                })
                .collect(),
        )
    }

    #[test]
    fn mode_answers() {
        let mut out = Vec::new();
        assert_eq!(prompt_mode(&mut Cursor::new("1\n"), &mut out).unwrap(), ModeArg::Full);
        assert_eq!(prompt_mode(&mut Cursor::new(" 2 \r\n"), &mut out).unwrap(), ModeArg::Compare);
        assert!(prompt_mode(&mut Cursor::new("3\n"), &mut out).is_err());
        assert!(prompt_mode(&mut Cursor::new(""), &mut out).is_err());
    }

    #[test]
    fn baseline_menu_lists_copies_and_returns_index() {
        let mut out = Vec::new();
        let index = prompt_baseline(&mut Cursor::new("2\n"), &mut out, &catalog()).unwrap();
        assert_eq!(index, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[1] = HarddiskVolumeShadowCopy1 Created at: 01/01/2023 10:00:00 AM"));
        assert!(text.contains("[3] = HarddiskVolumeShadowCopy3"));
    }

    #[test]
    fn baseline_out_of_range_or_garbage_is_rejected() {
        let mut out = Vec::new();
        assert!(prompt_baseline(&mut Cursor::new("0\n"), &mut out, &catalog()).is_err());
        assert!(prompt_baseline(&mut Cursor::new("4\n"), &mut out, &catalog()).is_err());
        assert!(prompt_baseline(&mut Cursor::new("two\n"), &mut out, &catalog()).is_err());
    }
}

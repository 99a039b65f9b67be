// 入力と出力が同一ファイルの場合の安全な置換書き込み

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// 一時ファイル名で拡張子の前に挿入する文字列。
pub const TEMP_INFIX: &str = "__tmp__";

/// 同一ファイル上書き時の置換計画 (一時ファイル → 対象ファイル)。
///
/// `commit` の成否にかかわらず、drop 時に一時ファイルが残っていれば削除する。
#[derive(Debug)]
pub struct ReplacePlan {
    temp_path: PathBuf,
    target_path: PathBuf,
}

impl ReplacePlan {
    /// 出力パスが入力パスと同じファイルを指す場合のみ計画を作る。
    ///
    /// 存在しない出力パスは入力と同一にはなりえない。
    pub fn for_paths(input: &Path, output: &Path) -> Option<Self> {
        if !same_file(input, output) {
            return None;
        }
        Some(Self {
            temp_path: temp_sibling(output),
            target_path: output.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// 一時ファイルで対象ファイルを置き換える。
    pub fn commit(self) -> crate::error::Result<()> {
        debug!(
            temp = %self.temp_path.display(),
            target = %self.target_path.display(),
            "replacing target with temporary file"
        );
        fs::rename(&self.temp_path, &self.target_path)?;
        Ok(())
    }
}

impl Drop for ReplacePlan {
    fn drop(&mut self) {
        if self.temp_path.exists()
            && let Err(e) = fs::remove_file(&self.temp_path)
        {
            warn!(
                temp = %self.temp_path.display(),
                "failed to remove temporary file: {e}"
            );
        }
    }
}

/// `dir/name.pdf` → `dir/name__tmp__.pdf`
pub fn temp_sibling(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{stem}{TEMP_INFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{TEMP_INFIX}"),
    };
    target.with_file_name(name)
}

/// 正規化したパスが一致するか。どちらかが解決できなければ別ファイルとみなす。
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// ドキュメントを書き出す。
///
/// `save` は書き込み先パスを受け取って実際の保存を行う。
/// 出力が入力と同一ファイルなら兄弟の一時ファイルへ保存してから rename で置換し、
/// 保存・置換が失敗しても一時ファイルは必ず削除される。対象ファイルは rename が
/// 成功するまで元のまま残る。
pub fn write_atomically<T, F>(input: &Path, output: &Path, save: F) -> crate::error::Result<T>
where
    F: FnOnce(&Path) -> crate::error::Result<T>,
{
    match ReplacePlan::for_paths(input, output) {
        Some(plan) => {
            let value = save(plan.temp_path())?;
            plan.commit()?;
            Ok(value)
        }
        None => save(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_sibling_inserts_infix_before_extension() {
        let p = temp_sibling(Path::new("/a/b/doc.pdf"));
        assert_eq!(p, Path::new("/a/b/doc__tmp__.pdf"));
    }

    #[test]
    fn test_temp_sibling_without_extension() {
        let p = temp_sibling(Path::new("/a/b/doc"));
        assert_eq!(p, Path::new("/a/b/doc__tmp__"));
    }

    #[test]
    fn test_missing_output_is_not_same_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("in.pdf");
        fs::write(&input, b"x").expect("write");
        assert!(ReplacePlan::for_paths(&input, &dir.path().join("out.pdf")).is_none());
    }
}

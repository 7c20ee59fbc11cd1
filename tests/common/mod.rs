#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;

/// Shell scripts standing in for `Rscript`. Each receives the script path as `$1`.
const FAKES: &[(&str, &str)] = &[
    ("echo", "echo \"hello from R\"\necho \"a warning\" >&2\n"),
    ("cat", "cat \"$1\"\n"),
    ("pwd", "pwd\n"),
    ("fail", "echo \"partial output\"\necho \"Error: object 'y' not found\" >&2\nexit 3\n"),
    ("sleep", "sleep 5\n"),
    ("silent", "exit 0\n"),
    ("version", "echo \"Rscript (R) version 4.3.1 (2023-06-16)\"\n"),
    ("old-version", "echo \"R scripting front-end version 3.6.3\" >&2\n"),
    (
        "grab",
        r#"out=$(sed -n 's/^\.rinterface_out <- "\(.*\)"$/\1/p' "$1")
dir=$(sed -n 's/^\.rinterface_dir <- "\(.*\)"$/\1/p' "$1")
printf '"id","species"\n1,"setosa"\n2,NA\n' > "$dir/grab_df_4.csv"
printf 'n=VECTOR:42\n' >> "$out"
printf 'labels=VECTOR:"a","b, c"\n' >> "$out"
printf 'm=ARRAY:2x2:1,2,3,4\n' >> "$out"
printf 'df=DATAFRAME:%s\n' "$dir/grab_df_4.csv" >> "$out"
echo "done"
"#,
    ),
];

struct Fakes {
    _dir: TempDir,
    root: PathBuf,
}

fn fakes() -> &'static Fakes {
    static FAKES_DIR: OnceLock<Fakes> = OnceLock::new();
    // all fakes are written before anything is spawned, so no exec races a
    // still-open write handle
    FAKES_DIR.get_or_init(|| {
        let dir = TempDir::new().expect("create fake interpreter dir");
        for (name, body) in FAKES {
            let path = dir.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write fake interpreter");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake interpreter");
        }
        let root = dir.path().to_path_buf();
        Fakes { _dir: dir, root }
    })
}

pub fn fake_rscript(name: &str) -> PathBuf {
    let path = fakes().root.join(name);
    assert!(path.exists(), "unknown fake interpreter {name}");
    path
}

pub const GRAB_SCRIPT: &str = "\
x <- 1
# @grab{int}
n <- 42L
# @grab{list[str]}
labels <- c('a', 'b, c')
# @grab{matrix}
m <- matrix(1:4, nrow = 2)
# @grab{data.frame}
df <- data.frame(id = 1:2, species = c('setosa', NA))
";

pub fn entries(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect()
}

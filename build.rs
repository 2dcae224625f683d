use std::{env, fs, io::Write, path::Path};

use walkdir::WalkDir;

const EXT: &str = "chain";
const TEST_DIR: &str = "tests";
const HARNESS_DIR: &str = "chains";
const OUT_NAME: &str = "tests.rs";

fn main() {
    // Create a timestamp file
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("timestamp.txt");

    let mut f = fs::File::create(dest_path).unwrap();
    write!(f, r#""{}""#, chrono::Utc::now().to_rfc3339()).unwrap();

    // Generate the tests
    let mut tests = String::new();
    let mut in_dir = env::current_dir().unwrap();
    in_dir.push(TEST_DIR);
    in_dir.push(HARNESS_DIR);
    for entry in WalkDir::new(&in_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != EXT) {
            continue;
        }

        let root = path.parent().unwrap();
        let parent = root.file_name().unwrap().to_str().unwrap();
        let name = path.file_stem().unwrap().to_str().unwrap();
        let contents = fs::read_to_string(path).unwrap();
        tests += "#[test]\n";
        tests += &format!("fn {parent}_{name}() {{\n");
        tests += "    let _ = env_logger::builder().is_test(true).try_init();\n";
        tests += "    color_backtrace::install();\n";
        tests += &format!("    let (stdout, stderr) = run_fixture(\"{name}\", r#\"{contents}\"#);\n");

        let stdout = root.join(format!("{name}.stdout"));
        if stdout.exists() {
            tests += &format!(
                "    assert!(diff_with_file(\"{stdout}\", \"{name}\", &stdout).is_ok());\n",
                stdout = stdout.display()
            );
        } else {
            tests += "    assert!(stdout.is_empty(), \"unexpected output:\\n{stdout}\");\n";
        }

        let stderr = root.join(format!("{name}.stderr"));
        if stderr.exists() {
            tests += &format!(
                "    assert!(diff_with_file(\"{stderr}\", \"{name}\", &stderr).is_ok());\n",
                stderr = stderr.display()
            );
        } else {
            tests += "    assert!(stderr.is_empty(), \"unexpected errors:\\n{stderr}\");\n";
        }

        tests += "}\n\n";
    }

    let dest_path = Path::new(&out_dir).join(OUT_NAME);
    fs::write(dest_path, tests).unwrap();

    println!("cargo:rerun-if-changed={TEST_DIR}/{HARNESS_DIR}");
}

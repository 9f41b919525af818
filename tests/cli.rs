use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn farscan() -> Command {
    Command::cargo_bin("farscan").unwrap()
}

fn write_eigen_case(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("egn_values.dat"), "0.5 0.01\n2.0e6 0.02\n0.7 0.03\n").unwrap();
    fs::write(dir.join("egn_mode_asci.dat"), "3\n1\n2\n1\n1\n").unwrap();
}

fn write_growth_log(dir: &Path, gammas: [f64; 2]) {
    fs::create_dir_all(dir).unwrap();
    let text = format!(
        " FAR3D run\n psi   : m=  1 n=  1 gamma= {} omega=  0.50\n phi   : m=  1 n=  1 gamma= {} omega=  0.52\n",
        gammas[0], gammas[1]
    );
    fs::write(dir.join("farprt"), text).unwrap();
}

#[test]
fn requires_a_command() {
    farscan().assert().failure();
}

#[test]
fn eigen_lists_accepted_values() {
    let dir = TempDir::new().unwrap();
    write_eigen_case(dir.path());
    farscan()
        .arg("eigen")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 eigenvalues accepted"))
        .stdout(predicate::str::contains("code units"));
}

#[test]
fn eigen_reports_missing_files() {
    let dir = TempDir::new().unwrap();
    farscan()
        .arg("eigen")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing file"));
}

#[test]
fn growth_threshold_controls_convergence() {
    let dir = TempDir::new().unwrap();
    write_growth_log(dir.path(), [0.10, 0.11]);
    let log = dir.path().join("farprt");

    farscan()
        .arg("growth")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("not converged").not());

    farscan()
        .args(["growth", "--threshold", "0.01"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("not converged"));
}

#[test]
fn truncated_namelist_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Input_Model");
    fs::write(&file, "! FAR3D input namelist\n! nstres\n0\n").unwrap();
    farscan()
        .arg("namelist")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode namelist"));
}

#[test]
fn modes_summarizes_tables() {
    let dir = TempDir::new().unwrap();
    let header = "  r   1/ 1   2/ 1  -1/ 1  -2/ 1\n";
    for run in ["0001", "0002"] {
        let body = "0.0  0.0  0.0  0.0  0.0\n0.5  3.0  1.0  4.0  0.0\n";
        fs::write(dir.path().join(format!("psi_{}", run)), format!("{}{}", header, body)).unwrap();
        let energy = "  time   1/ 1   2/ 1\n2.0  0.25  0.5\n";
        fs::write(dir.path().join(format!("ekenc_{}", run)), energy).unwrap();
    }
    farscan()
        .arg("modes")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 runs, 2 modes"))
        .stdout(predicate::str::contains("peak 5.0000 at n=1 m=1"))
        .stdout(predicate::str::contains("ekenc    energy 0.75000 at t=2.0000"));
}

#[test]
fn scan1d_prints_every_cell() {
    let dir = TempDir::new().unwrap();
    for value in ["0.10", "0.20"] {
        let case = dir.path().join(format!("beta_{}", value));
        write_eigen_case(&case);
        write_growth_log(&case, [0.10, 0.10]);
    }
    farscan()
        .arg("scan1d")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("beta: 2 values, 2 decimals"))
        .stdout(predicate::str::contains("beta=0.10"))
        .stdout(predicate::str::contains("beta=0.20"))
        .stdout(predicate::str::contains("eigen j=1"));
}

#[test]
fn scan2d_skips_missing_cells_on_request() {
    let dir = TempDir::new().unwrap();
    for a in ["1", "2"] {
        for b in ["5", "6"] {
            let case = dir.path().join(format!("a_{}", a)).join(format!("b_{}", b));
            fs::create_dir_all(&case).unwrap();
            if a == "1" {
                write_eigen_case(&case);
                write_growth_log(&case, [0.10, 0.10]);
            }
        }
    }

    farscan().arg("scan2d").arg(dir.path()).assert().failure();

    farscan()
        .args(["scan2d", "--skip-missing"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a=2 b=6  omega=NaN gamma=NaN  eigen missing"));
}

#[test]
fn scan2d_exports_growth_rates() {
    let dir = TempDir::new().unwrap();
    for a in ["1", "2"] {
        for b in ["5", "6"] {
            let case = dir.path().join(format!("a_{}", a)).join(format!("b_{}", b));
            write_eigen_case(&case);
            write_growth_log(&case, [0.10, 0.20]);
        }
    }
    let out = TempDir::new().unwrap();
    let file = out.path().join("growth.nc");
    farscan()
        .arg("scan2d")
        .arg(dir.path())
        .arg("--export")
        .arg(&file)
        .assert()
        .success();
    assert!(file.is_file());

    farscan()
        .arg("scan2d")
        .arg(dir.path())
        .arg("--export")
        .arg(out.path().join("missing").join("growth.nc"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to export growth rates"));
}

use assert_cmd::Command;
use farscan::eigen::FrequencyUnits;
use farscan::farprt::FarprtReport;
use farscan::namelist::{
    encode, write_namelist, FieldKind, NamelistRecord, NamelistValue, VectorLen, NAMELIST_SCHEMA,
};
use farscan::scan::Scan;
use farscan::{FarError, MissingCellPolicy, ReaderConfig};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROFILES: &str = "Profiles for FAR3D
Magnetic field (T)
2.0
Major radius (m)
1.5
Minor radius (m)
0.5
Elongation
1.6
Triangularity
0.3
Main impurity
Carbon
mi/mp
2.0
beta0 = 0.012, Rmax = 2.1

rho q nnbi ni ne nimp tnbi ti te pnbi p pequil vtor vpol
0.0 1.0 0.01 0.4 0.42 0.01 50.0 2.0 2.5 10.0 20.0 19.0 30.0 1.0
1.0 2.0 0.01 0.1 0.12 0.01 50.0 2.0 2.5 10.0 20.0 19.0 30.0 1.0
";

const ENERGY: &str = "\
energy:numrun=0001, numruno=0000, nstep=100, time=1.0, dt=1.0E-02

    l    m    n        ke              me           vprlf      gamke      gamme     gamvpr
    1    1    1      1.0000E-05      2.0000E-05      0.0000E+00    1.0E-02    1.0E-02    0.0E+00
    2    2    1      3.0000E-05      4.0000E-05      0.0000E+00    2.0E-02    2.0E-02    0.0E+00

energy:numrun=0001, numruno=0000, nstep=200, time=2.0, dt=1.0E-02

    l    m    n        ke              me           vprlf      gamke      gamme     gamvpr
    1    1    1      5.0000E-05      6.0000E-05      0.0000E+00    3.0E-02    3.0E-02    0.0E+00
    2    2    1      7.0000E-05      8.0000E-05      0.0000E+00    4.0E-02    4.0E-02    0.0E+00

";

/// Every field set; vector lengths driven by integer fields are 2.
fn full_record() -> NamelistRecord {
    let len = |len: VectorLen| match len {
        VectorLen::Fixed(n) => n,
        VectorLen::Field(_) => 2,
    };
    let mut record = NamelistRecord::empty();
    for spec in NAMELIST_SCHEMA.iter() {
        let value = match spec.kind {
            FieldKind::Int => NamelistValue::Int(match spec.name {
                "alpha_on" | "DIIID_u" => 0,
                _ => 2,
            }),
            FieldKind::Float => NamelistValue::Float(0.25),
            FieldKind::Bool => NamelistValue::Bool(true),
            FieldKind::Text => NamelistValue::Text(match spec.name {
                "numrun" => "0001".to_string(),
                "numruno" => "0000".to_string(),
                "ext_prof_name" => "prof.dat".to_string(),
                other => other.to_string(),
            }),
            FieldKind::IntVector(n) => NamelistValue::IntVector(vec![1; len(n)]),
            FieldKind::FloatVector(n) => NamelistValue::FloatVector(vec![0.5; len(n)]),
        };
        record.set(spec.name, value).unwrap();
    }
    record
}

fn write_farprt(dir: &Path) -> PathBuf {
    let mut text = Vec::new();
    for i in 0..11 {
        text.extend_from_slice(format!(" FAR3D banner line {}\n", i).as_bytes());
    }
    encode(&full_record(), &mut text).unwrap();
    let mut text = String::from_utf8(text).unwrap();
    text.push_str(ENERGY);
    text.push_str(" psi   : m=  1 n=  1 gamma=  0.020 omega=  0.30\n");
    text.push_str(" phi   : m=  1 n=  1 gamma=  0.021 omega=  0.31\n");
    let path = dir.join("farprt");
    fs::write(&path, text).unwrap();
    path
}

fn write_case(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    write_namelist(&full_record(), &dir.join("Input_Model")).unwrap();
    fs::write(dir.join("prof.dat"), PROFILES).unwrap();
    fs::write(dir.join("egn_values.dat"), "0.5 0.01\n3.0e6 0.9\n0.25 0.04\n").unwrap();
    fs::write(dir.join("egn_mode_asci.dat"), "3\n1\n2\n1\n1\n").unwrap();
    write_farprt(dir);
}

#[test]
fn renormalization_converts_every_cell_to_khz() {
    let root = TempDir::new().unwrap();
    for value in ["1.0", "1.5", "2.0"] {
        write_case(&root.path().join(format!("41091_bet0_f_{}", value)));
    }

    let mut scan = Scan::discover_1d(root.path(), Some("41091_"), ReaderConfig::default()).unwrap();
    assert_eq!(scan.axes[0].name, "bet0_f");
    assert_eq!(scan.axes[0].values, vec![1.0, 1.5, 2.0]);

    scan.read_profiles(false).unwrap();
    scan.read_eigensolver(false).unwrap();
    let factor = scan.renormalize_eigen_frequencies(false).unwrap();
    assert!((factor - 517.499_637_783_305_8).abs() < 1e-9);

    for set in scan.eigen.as_ref().unwrap().iter() {
        let set = set.as_ref().unwrap();
        assert_eq!(set.units, FrequencyUnits::KiloHertz);
        assert_eq!(set.values.len(), 2);
        assert!((set.values.omega[1] - 0.25 * factor).abs() < 1e-9);
        assert_eq!(set.values.most_unstable(), Some(1));
    }
}

#[test]
fn complete_namelists_are_read_for_every_cell() {
    let root = TempDir::new().unwrap();
    for value in ["0.1", "0.2"] {
        write_case(&root.path().join(format!("beta_{}", value)));
    }
    let mut scan = Scan::discover_1d(root.path(), None, ReaderConfig::default()).unwrap();
    scan.read_namelists(true).unwrap();
    let namelists = scan.namelists.as_ref().unwrap();
    assert!(namelists.iter().all(Option::is_some));
    for record in namelists.iter().flatten() {
        assert_eq!(record.text("ext_prof_name"), Some("prof.dat"));
        assert_eq!(record, &full_record());
    }
}

#[test]
fn missing_cells_abort_or_stay_empty() {
    let root = TempDir::new().unwrap();
    write_case(&root.path().join("beta_0.1"));
    fs::create_dir_all(root.path().join("beta_0.2")).unwrap();

    let mut scan = Scan::discover_1d(root.path(), None, ReaderConfig::default()).unwrap();
    let err = scan.read_growth_rate().unwrap_err();
    assert!(matches!(err, FarError::MissingFile { .. }));

    let config = ReaderConfig::default().with_missing_cell_policy(MissingCellPolicy::SkipAsMissing);
    let mut scan = Scan::discover_1d(root.path(), None, config).unwrap();
    scan.read_growth_rate().unwrap();
    let omega = scan.omega.as_ref().unwrap();
    assert!((omega[[0]] - 0.305).abs() < 1e-12);
    assert!(omega[[1]].is_nan());
}

#[test]
fn farprt_sections_decode_together() {
    let dir = TempDir::new().unwrap();
    let report = FarprtReport::new(&write_farprt(dir.path()), &ReaderConfig::default());

    assert_eq!(report.namelist().unwrap(), full_record());

    let energy = report.energy_block().unwrap();
    assert_eq!(energy.rows.len(), 4);
    assert_eq!(energy.steps(), vec![(100, 1.0), (200, 2.0)]);
    assert_eq!(energy.step_to_time(200), Some(2.0));
    assert_eq!(energy.time_to_step(1.2), Some(100));
    let history: Vec<f64> = energy.harmonic(1, 2).map(|row| row.te).collect();
    assert_eq!(history.len(), 2);
    assert!((history[1] - 1.5e-4).abs() < 1e-15);

    let growth = report.growth_rate().unwrap();
    assert!(growth.converged());
    assert_eq!(growth.n, vec![1]);
}

#[test]
fn cli_reads_the_embedded_namelist_and_energy() {
    let dir = TempDir::new().unwrap();
    let log = write_farprt(dir.path());

    Command::cargo_bin("farscan")
        .unwrap()
        .args(["namelist", "--header", "11"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("'prof.dat'"))
        .stdout(predicate::str::contains("<unset>").not());

    Command::cargo_bin("farscan")
        .unwrap()
        .arg("energy")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 rows over 2 steps"))
        .stdout(predicate::str::contains("nstep 100 .. 200"));
}

#[test]
fn cli_scan_with_renormalization() {
    let root = TempDir::new().unwrap();
    for value in ["0.10", "0.20"] {
        write_case(&root.path().join(format!("beta_{}", value)));
    }
    Command::cargo_bin("farscan")
        .unwrap()
        .args(["scan1d", "--renorm"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("beta=0.20"))
        .stdout(predicate::str::contains("eigen j=1 omega=129.37"));
}

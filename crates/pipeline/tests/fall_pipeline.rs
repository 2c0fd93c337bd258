//! SisFall recordings through feature extraction and into training splits.

use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::read_npy;
use wayfarer_pipeline::motion::{extract_sisfall, FEATURE_COUNT};
use wayfarer_pipeline::split::{balance_and_split, load_set, DEFAULT_SEED};

/// `rows` records of 1 g on the x axis and no rotation.
fn write_recording(dir: &Path, name: &str, rows: usize) {
    let record = "  256,0,0,0,0,0,0,0,0;\n";
    std::fs::write(dir.join(name), record.repeat(rows)).unwrap();
}

#[test]
fn recordings_become_balanced_splits() {
    let tmp = tempfile::tempdir().unwrap();
    let subject = tmp.path().join("sisfall").join("SA01");
    std::fs::create_dir_all(&subject).unwrap();

    write_recording(&subject, "F01_SA01_R01.txt", 10);
    write_recording(&subject, "F03_SA01_R01.txt", 10);
    write_recording(&subject, "D01_SA01_R01.txt", 12);
    write_recording(&subject, "D02_SA01_R01.txt", 6);
    std::fs::write(subject.join("F02_SA01_R01.txt"), "1,2;\n").unwrap();
    std::fs::write(subject.join("Readme.txt"), "not a recording").unwrap();

    let dataset = extract_sisfall(&tmp.path().join("sisfall"), 4, 2).unwrap();
    assert_eq!(dataset.files_read, 4);
    assert_eq!(dataset.files_skipped, 1);
    assert_eq!(dataset.falls.dim(), (8, FEATURE_COUNT));
    assert_eq!(dataset.adls.dim(), (7, FEATURE_COUNT));
    assert_eq!(dataset.falls[[0, 0]], 1.0);
    assert_eq!(dataset.falls[[0, 4]], 0.0);

    let processed = tmp.path().join("processed");
    dataset.save(&processed).unwrap();

    let falls: ArrayD<f32> = read_npy(processed.join("fall_features.npy")).unwrap();
    let adls: ArrayD<f32> = read_npy(processed.join("adl_features.npy")).unwrap();
    let splits = balance_and_split(&falls, &adls, DEFAULT_SEED).unwrap();

    // 7 per class after balancing: 4 train, 1 val, 2 test each.
    assert_eq!(splits.train.len(), 8);
    assert_eq!(splits.val.len(), 2);
    assert_eq!(splits.test.len(), 4);
    assert_eq!(splits.train.positives(), 4);
    assert_eq!(splits.test.positives(), 2);

    let out = tmp.path().join("splits");
    splits.save(&out).unwrap();
    let reloaded = load_set(&out.join("X_train.npy"), &out.join("y_train.npy")).unwrap();
    assert_eq!(reloaded.len(), 8);
    assert_eq!(reloaded.features.shape(), &[8, FEATURE_COUNT]);
}

use std::fs;
use std::path::Path;

use anicompare::error::AnicompareError;
use anicompare::identity::{extract_code, ExtractionPolicy};
use anicompare::metrics::{DnaDiff, FastAni, Mash, SourceKind};
use anicompare::pair::{PairKey, RawPair};
use anicompare::reader::{Layout, SourceFormat, SourceReader, Variant};

fn key(a: &str, b: &str) -> PairKey {
    PairKey::new(extract_code(a).unwrap(), extract_code(b).unwrap())
}

fn write(path: &Path, content: &str) {
    fs::write(path, content).expect("write fixture");
}

#[test]
fn dnadiff_skips_header_and_buckets_codeless_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dnadiff.csv");
    write(
        &path,
        "file1,file2,aligned_bases,AvgIdentity,SNPs\n\
         GCA_000009765_S_avermitilis,GCF_000203835_S_coelicolor,5000000,87.25,41000\n\
         unnamed_assembly,GCF_000203835_S_coelicolor,1200,99.5,3\n",
    );
    let reading = SourceReader::<DnaDiff>::for_variant(Variant::Raw).read(&path).expect("read");
    assert_eq!(reading.mapping.len(), 1);
    assert_eq!(reading.mapping.source(), SourceKind::DnaDiff);
    let metrics = reading
        .mapping
        .get(&key("GCF_000203835", "GCA_000009765"))
        .expect("pair");
    assert_eq!(
        metrics,
        &DnaDiff { aligned_bases: 5_000_000, avg_identity: 87.25, snps: 41_000 }
    );
    let raw = RawPair("unnamed_assembly".into(), "GCF_000203835_S_coelicolor".into());
    assert_eq!(reading.unhandled.get(&raw).map(|m| m.snps), Some(3));
}

#[test]
fn duplicate_pair_in_one_file_keeps_last_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dnadiff.csv");
    write(
        &path,
        "GCA_00001_x,GCA_00002_y,1000,95.5,10\n\
         GCA_00002_y,GCA_00001_x,1100,96.0,8\n",
    );
    let reading = SourceReader::<DnaDiff>::for_variant(Variant::Raw).read(&path).unwrap();
    let k = key("GCA_00001_x", "GCA_00002_y");
    assert_eq!(reading.mapping.len(), 1);
    assert_eq!(reading.mapping.get(&k).unwrap().avg_identity, 96.0);
    assert_eq!(reading.mapping.overwritten(), &[k]);
}

#[test]
fn malformed_number_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dnadiff.csv");
    write(
        &path,
        "GCA_00001_x,GCA_00002_y,1000,95.5,10\n\
         GCA_00001_x,GCA_00003_z,2000,n/a,40\n",
    );
    let err = SourceReader::<DnaDiff>::for_variant(Variant::Raw).read(&path).unwrap_err();
    match err {
        AnicompareError::Parse { line, message, .. } => {
            assert_eq!(line, 2);
            assert!(message.contains("AvgIdentity"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn count_columns_reject_fractions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dnadiff.csv");
    write(&path, "GCA_00001_x,GCA_00002_y,1000.5,95.5,10\n");
    let err = SourceReader::<DnaDiff>::for_variant(Variant::Raw).read(&path).unwrap_err();
    assert!(matches!(err, AnicompareError::Parse { .. }));
}

#[test]
fn wrong_field_count_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mash.tsv");
    write(&path, "GCA_00001_x\tGCA_00002_y\t95.0\t0.01\n");
    let err = SourceReader::<Mash>::for_variant(Variant::Raw).read(&path).unwrap_err();
    assert!(format!("{err}").contains("expected 3 fields, found 4"));
}

#[test]
fn directory_reader_is_last_write_wins_across_files() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("batch_a.txt"), "GCA_00001_x\tGCA_00002_y\t97.0\t900\t1000\n");
    write(&dir.path().join("batch_b.txt"), "GCA_00002_y\tGCA_00001_x\t93.0\t800\t1000\n");
    write(&dir.path().join("notes.log"), "not\ta\tresult\n");
    let reading = SourceReader::<FastAni>::for_variant(Variant::Raw).read(dir.path()).unwrap();
    let k = key("GCA_00001_x", "GCA_00002_y");
    assert_eq!(reading.mapping.len(), 1);
    // batch_b.txt sorts after batch_a.txt, so its value is the one kept
    assert_eq!(reading.mapping.get(&k).unwrap().ani, 93.0);
    assert_eq!(reading.mapping.get(&k).unwrap().mappings, 800);
    assert_eq!(reading.mapping.overwritten().len(), 1);
}

#[test]
fn fastani_paths_use_marker_anywhere() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("run.txt"),
        "/genomes/GCA_000009765.2_genomic.fna\t/genomes/GCF_000203835.1_genomic.fna\t87.9\t2400\t2800\n",
    );
    let reading = SourceReader::<FastAni>::for_variant(Variant::Raw).read(dir.path()).unwrap();
    assert!(reading.mapping.contains_key(&key("GCA_000009765", "GCF_000203835")));
    assert!(reading.unhandled.is_empty());
}

#[test]
fn start_policy_buckets_prefixed_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mash.tsv");
    write(&path, "/genomes/GCA_000009765.fna\t/genomes/GCF_000203835.fna\t88.1\n");
    let format = SourceFormat::for_source(SourceKind::Mash, Variant::Raw)
        .with_policy(ExtractionPolicy::Start);
    let reading = SourceReader::<Mash>::new(format).read(&path).unwrap();
    assert!(reading.mapping.is_empty());
    assert_eq!(reading.unhandled.len(), 1);
}

#[test]
fn extract_variants_are_semicolon_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fastani_extract.csv");
    write(&path, "GCA_00001_x;GCA_00002_y;95.0;900;1000\n\n");
    let reader = SourceReader::<FastAni>::for_variant(Variant::Extract);
    assert_eq!(reader.format().delimiter, b';');
    assert_eq!(reader.format().layout, Layout::File);
    let reading = reader.read(&path).unwrap();
    assert_eq!(reading.mapping.len(), 1);
}

#[test]
fn raw_output_keeps_quote_characters_literally() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mash.tsv");
    write(
        &path,
        "\"GCA_000009765 strain MA-4680\".fna\t/genomes/GCF_000203835.fna\t88.1\n\
         \"GCA_00001_x\tGCA_00002_y_strain\"\t95.0\n",
    );
    let reading = SourceReader::<Mash>::for_variant(Variant::Raw).read(&path).unwrap();
    assert_eq!(
        reading.mapping.get(&key("GCA_000009765", "GCF_000203835")),
        Some(&Mash { ani: 88.1 })
    );
    // a quote does not join fields across the delimiter
    assert_eq!(
        reading.mapping.get(&key("GCA_00001_x", "GCA_00002_y_strain")),
        Some(&Mash { ani: 95.0 })
    );
}

#[test]
fn raw_aligner_summary_splits_inside_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dnadiff.csv");
    write(&path, "\"GCA_00001_x,GCA_00002_y\",1000,95.5,10\n");
    let reading = SourceReader::<DnaDiff>::for_variant(Variant::Raw).read(&path).unwrap();
    assert!(reading.mapping.is_empty());
    let raw = RawPair("\"GCA_00001_x".into(), "GCA_00002_y\"".into());
    assert_eq!(reading.unhandled.get(&raw).map(|m| m.aligned_bases), Some(1000));
}

#[test]
fn extract_variants_honour_quotes() {
    assert!(!SourceFormat::for_source(SourceKind::FastAni, Variant::Raw).quoting);
    assert!(SourceFormat::for_source(SourceKind::FastAni, Variant::Extract).quoting);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mash_extract.csv");
    write(&path, "\"GCA_00001_x\";GCA_00002_y;95.0\n");
    let reading = SourceReader::<Mash>::for_variant(Variant::Extract).read(&path).unwrap();
    assert_eq!(
        reading.mapping.get(&key("GCA_00001_x", "GCA_00002_y")),
        Some(&Mash { ani: 95.0 })
    );
}

#[test]
fn delimiter_override_replaces_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mash.csv");
    write(&path, "GCA_00001_x;GCA_00002_y;95.25\n");
    // read with the default tab the line is a single field
    assert!(SourceReader::<Mash>::for_variant(Variant::Raw).read(&path).is_err());
    let format = SourceFormat::for_source(SourceKind::Mash, Variant::Raw).with_delimiter(b';');
    let reading = SourceReader::<Mash>::new(format).read(&path).unwrap();
    assert_eq!(
        reading.mapping.get(&key("GCA_00001_x", "GCA_00002_y")),
        Some(&Mash { ani: 95.25 })
    );
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SourceReader::<Mash>::for_variant(Variant::Raw)
        .read(&dir.path().join("absent.tsv"))
        .unwrap_err();
    assert!(matches!(err, AnicompareError::Io { .. }));
}

use flate2::write::GzEncoder;
use flate2::Compression;
use sixdegrees::pipeline::{apply_amendment, prepare_import, Amendment, ProcessedPaths};
use sixdegrees::{load_snapshot, PathEngine, Pipeline, PipelineConfig, PipelineError};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_gz(path: &Path, rows: &[&str]) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    for row in rows {
        encoder.write_all(row.as_bytes()).unwrap();
        encoder.write_all(b"\n").unwrap();
    }
    encoder.finish().unwrap();
}

/// Raw tables for a small world:
/// Bacon and Singer in Footloose, Singer and Hanks in Trouble,
/// a TV series and a composer that must be dropped, and a person in a
/// non-movie title who must never reach the people file.
fn write_raw(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    write_gz(
        &dir.join("title.basics.tsv.gz"),
        &[
            "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres",
            "tt0087277\tmovie\tFootloose\tFootloose\t0\t1984\t\\N\t107\tDrama,Music",
            "tt0091000\tmovie\tTrouble\tTrouble\t0\t1986\t\\N\t95\tComedy",
            "tt0098904\ttvSeries\tSeinfeld\tSeinfeld\t0\t1989\t1998\t22\tComedy",
            "tt0000009\tmovie\tNever Cast\tNever Cast\t0\t\\N\t\\N\t\\N\t\\N",
        ],
    );
    write_gz(
        &dir.join("title.principals.tsv.gz"),
        &[
            "tconst\tordering\tnconst\tcategory\tjob\tcharacters",
            "tt0087277\t1\tnm0000102\tactor\t\\N\t[\"Ren\"]",
            "tt0087277\t2\tnm0001742\tactress\t\\N\t[\"Ariel\"]",
            "tt0087277\t3\tnm0006133\tcomposer\t\\N\t\\N",
            "tt0091000\t1\tnm0001742\tactress\t\\N\t\\N",
            "tt0091000\t2\tnm0000158\tactor\t\\N\t\\N",
            "tt0091000\t3\tnm0000404\tdirector\t\\N\t\\N",
            "tt0098904\t1\tnm0000632\tactor\t\\N\t\\N",
        ],
    );
    // nm0000404 directed Trouble but has no name row: the edge is removed
    write_gz(
        &dir.join("name.basics.tsv.gz"),
        &[
            "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles",
            "nm0000102\tKevin Bacon\t1958\t\\N\tactor\ttt0087277",
            "nm0001742\tLori Singer\t1957\t\\N\tactress\ttt0087277",
            "nm0000158\tTom Hanks\t1956\t\\N\tactor\ttt0091000",
            "nm0000632\tJerry Seinfeld\t1954\t\\N\tactor\ttt0098904",
            "nm0006133\tKenny Loggins\t1948\t\\N\tcomposer\ttt0087277",
        ],
    );
}

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        raw_dir: root.join("raw"),
        processed_dir: root.join("processed"),
        import_dir: root.join("import"),
        chunk_size: 2,
        ..Default::default()
    }
}

#[test]
fn test_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_raw(&config.raw_dir);

    let report = Pipeline::new(config.clone()).run().unwrap();
    assert_eq!(report.movies.kept, 3);
    assert_eq!(report.movies.filtered, 1);
    assert_eq!(report.principals.kept, 5);
    assert_eq!(report.principals.filtered, 2);
    assert_eq!(report.names.kept, 3);
    assert_eq!(report.finalize.kept, 4);
    assert_eq!(report.finalize.filtered, 1);

    let paths = config.processed_paths();
    let people = std::fs::read_to_string(&paths.people).unwrap();
    assert!(people.starts_with("nconst,primaryName,birthYear\n"));
    assert!(people.contains("nm0000158,Tom Hanks,1956"));
    assert!(!people.contains("Seinfeld"));
    assert!(!people.contains("Loggins"));

    let roles = std::fs::read_to_string(&paths.roles).unwrap();
    assert!(!roles.contains("nm0000404"));
    assert_eq!(roles.lines().count(), 5);

    let (snapshot, load) = load_snapshot(&paths, 2).unwrap();
    assert_eq!(load.rejected(), 0);
    assert_eq!(snapshot.person_count(), 3);
    assert_eq!(snapshot.movie_count(), 3);
    assert_eq!(snapshot.edge_count(), 4);

    let result = PathEngine::default()
        .find_shortest_path_str(&snapshot, "nm0000102", "nm0000158")
        .unwrap();
    assert!(result.path_found);
    assert_eq!(result.hops, 4);
    assert_eq!(result.degrees, Some(2));
    assert_eq!(result.steps[2].name, "Lori Singer");

    // The isolated movie is in the graph but reaches nothing
    let result = PathEngine::default()
        .find_shortest_path_str(&snapshot, "tt0000009", "nm0000102")
        .unwrap();
    assert!(!result.path_found);
}

#[test]
fn test_pipeline_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_raw(&config.raw_dir);
    let pipeline = Pipeline::new(config.clone());

    let first = pipeline.run().unwrap();
    let roles = std::fs::read_to_string(config.processed_paths().roles).unwrap();
    let second = pipeline.run().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        roles,
        std::fs::read_to_string(config.processed_paths().roles).unwrap()
    );
}

#[test]
fn test_missing_raw_table_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    std::fs::create_dir_all(&config.raw_dir).unwrap();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, PipelineError::SourceUnreadable { .. }));
}

#[test]
fn test_export_and_amend_then_reload() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_raw(&config.raw_dir);
    Pipeline::new(config.clone()).run().unwrap();

    let export = prepare_import(&config.processed_dir, &config.import_dir).unwrap();
    assert_eq!(export.files.len(), 3);
    let movies = std::fs::read_to_string(config.import_dir.join("movies.csv")).unwrap();
    assert!(!movies.contains("tconst"));
    assert_eq!(
        std::fs::read_to_string(config.import_dir.join("people_header.csv"))
            .unwrap()
            .trim_end(),
        "nconst:ID(Person),name,born:int"
    );

    let amendment = Amendment::from_yaml(
        "people:\n  - { nconst: nm0000404, primaryName: Some Director, birthYear: null }\n\
         roles:\n  - { tconst: tt0000009, nconst: nm0000404, category: director }\n  \
         - { tconst: tt0000009, nconst: nm0000102, category: actor }\n",
    )
    .unwrap();
    let paths = ProcessedPaths::in_dir(&config.processed_dir);
    let report = apply_amendment(&paths, &amendment, 10).unwrap();
    assert_eq!(report.people_added, 1);
    assert_eq!(report.roles_added, 2);
    assert!(report.rejected.is_empty());

    let (snapshot, _) = load_snapshot(&paths, 10).unwrap();
    let result = PathEngine::default()
        .find_shortest_path_str(&snapshot, "nm0000404", "nm0000158")
        .unwrap();
    assert!(result.path_found);
    assert_eq!(result.degrees, Some(3));
}

#[test]
fn test_ungrouped_duplicate_roles_never_reach_import() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    std::fs::create_dir_all(&config.raw_dir).unwrap();
    write_gz(
        &config.raw_dir.join("title.basics.tsv.gz"),
        &[
            "tconst\ttitleType\tprimaryTitle\tstartYear",
            "tt1\tmovie\tFirst\t2001",
            "tt2\tmovie\tSecond\t2002",
        ],
    );
    // The repeated tt1/nm1 row is not adjacent to the first one
    write_gz(
        &config.raw_dir.join("title.principals.tsv.gz"),
        &[
            "tconst\tordering\tnconst\tcategory",
            "tt1\t1\tnm1\tactor",
            "tt2\t1\tnm2\tactor",
            "tt1\t2\tnm1\tactor",
        ],
    );
    write_gz(
        &config.raw_dir.join("name.basics.tsv.gz"),
        &[
            "nconst\tprimaryName\tbirthYear",
            "nm1\tOne\t1970",
            "nm2\tTwo\t1971",
        ],
    );

    let report = Pipeline::new(config.clone()).run().unwrap();
    assert_eq!(report.finalize.kept, 2);
    assert_eq!(report.finalize.duplicates, 1);

    prepare_import(&config.processed_dir, &config.import_dir).unwrap();
    assert_eq!(
        std::fs::read_to_string(config.import_dir.join("roles.csv")).unwrap(),
        "tt1,nm1,actor\ntt2,nm2,actor\n"
    );

    let (_, load) = load_snapshot(&config.processed_paths(), 10).unwrap();
    assert_eq!(load.duplicate_edges, 0);
    assert_eq!(load.participations, 2);
}

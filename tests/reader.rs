use std::fs::File;
use std::io::{BufReader, Write};

use attr_filtering::base::MinMax;
use attr_filtering::composition::Composition;
use attr_filtering::metric::{Dcg, SearchQualityMetric};
use attr_filtering::reader::read_results_list;
use rand::{rngs::StdRng, SeedableRng};
use temp_dir::TempDir;

use helpers::lists::{create_relevance_list, write_results_rows};

#[test]
fn test_read_list_from_file() {
    let dir = TempDir::new().expect("could not create temporary directory");
    let path = dir.path().join("list.tsv");

    let mut rng = StdRng::seed_from_u64(2);
    let relevances = create_relevance_list(100, &mut rng);
    {
        let mut file = File::create(&path).expect("could not create the list file");
        write_results_rows(&mut file, &relevances).expect("could not write the list file");
    }

    let file = File::open(&path).expect("could not reopen the list file");
    let list = read_results_list(&mut BufReader::new(file), None).expect("readable list");
    assert_eq!(list.len(), relevances.len());
    assert_eq!(list.relevances, relevances);
    assert!(list.attributes.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(list.ids[0], "doc0");
}

#[test]
fn test_filter_a_file_end_to_end() {
    let dir = TempDir::new().expect("could not create temporary directory");
    let path = dir.path().join("list.tsv");
    {
        let mut file = File::create(&path).expect("could not create the list file");
        // relevances 1..=6 over ascending attributes
        for (i, relevance) in [1., 4., 2., 6., 3., 5.].iter().enumerate() {
            writeln!(file, "doc{}\t{}.5\t{}", i, i, relevance).expect("writable file");
        }
    }

    let file = File::open(&path).expect("could not reopen the list file");
    let list = read_results_list(&mut BufReader::new(file), None).expect("readable list");

    let metric = Dcg::with_max_position(2);
    let composition = Composition::new("OPT", None, 2, 1, 0., 0.).unwrap();
    let outcome = composition.run(&metric, &list.relevances, &MinMax::of(&list.relevances));

    // doc3 (relevance 6) is the anchor; doc5 (relevance 5) follows it
    let selected: Vec<&str> = outcome
        .indices
        .iter()
        .map(|&ix| list.ids[ix as usize].as_str())
        .collect();
    assert_eq!(selected, vec!["doc3", "doc5"]);
}

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::process;
use word_manifold::export::read_neighbors_json;
use word_manifold::WordNeighbors;


// prints the stored nearest neighbors of query words, so a finished run can be
// inspected without opening the output files.
// arguments:
// path to a *_nearest_neighbors.json written by word-manifold
// path to a file holding one query word per line
// example: ... data/english/neighbors/brown_1000_9_nearest_neighbors.json queries.txt

fn main() {

    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <nearest_neighbors.json> <queries.txt>", args[0]);
        process::exit(2);
    }

    if let Err(e) = run(Path::new(&args[1]), Path::new(&args[2])) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(neighbors_path: &Path, queries_path: &Path) -> Result<(), Box<dyn Error>> {

    let neighbors = read_neighbors_json(neighbors_path)?;
    let lines = io::BufReader::new(File::open(queries_path)?).lines();

    let mut queries: Vec<String> = Vec::new();
    for line in lines {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            queries.push(word.to_string());
        }
    }

    print_neighbors(&neighbors, &queries);
    Ok(())
}

fn print_neighbors(neighbors: &WordNeighbors, queries: &[String]) {

    for word in queries {
        match neighbors.get(word) {
            Some(list) => {
                println!("{} ({} neighbors):", word, list.len());
                for (i, neighbor) in list.iter().enumerate() {
                    println!("{:4}: {}", i + 1, neighbor);
                }
            }
            None => println!("'{}' was not among the analyzed words", word),
        }
        println!();
    }
}


// neighbor list, neighbor graph and inspection map writers

use crate::contexts::InspectionMap;
use crate::error::{ManifoldError, Result};
use crate::files_handling::{read_input, save_output, write_text};
use crate::neighbors::WordNeighbors;

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use serde_json::{Map, Value};


/// Header lines of the plain text neighbor list.
#[derive(Clone, Debug)]
pub struct ListHeader<'a> {
    pub language: &'a str,
    pub corpus: &'a str,
    pub word_types: usize,
    pub neighbors: usize,
}

/// `#` header followed by one `word n1 n2 ... nk` line per analyzed word.
pub fn neighbor_list_text(header: &ListHeader, neighbors: &WordNeighbors) -> String {

    let mut text = String::new();
    let _ = writeln!(text, "# language: {}", header.language);
    let _ = writeln!(text, "# corpus: {}", header.corpus);
    let _ = writeln!(text, "# Number of word types analyzed: {}", header.word_types);
    let _ = writeln!(text, "# Number of neighbors: {}", header.neighbors);
    text.push('\n');

    for (word, list) in neighbors.iter() {
        text.push_str(word);
        for neighbor in list {
            text.push(' ');
            text.push_str(neighbor);
        }
        text.push('\n');
    }
    text
}

pub fn write_neighbor_list(path: &Path, header: &ListHeader, neighbors: &WordNeighbors) -> Result<()> {
    write_text(path, &neighbor_list_text(header, neighbors))
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// GEXF document of the undirected neighbor graph: one node per word (analyzed words
/// first, in order), one edge per unordered word pair linked by a neighbor relation.
pub fn neighbor_graph_gexf(neighbors: &WordNeighbors) -> String {

    let mut node_ids: HashMap<&str, usize> = HashMap::new();
    let mut nodes: Vec<&str> = Vec::new();

    for (word, list) in neighbors.iter() {
        for w in std::iter::once(word).chain(list.iter().map(String::as_str)) {
            if !node_ids.contains_key(w) {
                node_ids.insert(w, nodes.len());
                nodes.push(w);
            }
        }
    }

    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for (word, list) in neighbors.iter() {
        let a = node_ids[word];
        for neighbor in list {
            let b = node_ids[neighbor.as_str()];
            let key = (a.min(b), a.max(b));
            if a != b && seen.insert(key) {
                edges.push((a, b));
            }
        }
    }

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<gexf xmlns=\"http://www.gexf.net/1.2draft\" version=\"1.2\">
  <graph mode=\"static\" defaultedgetype=\"undirected\">
    <nodes>
");
    for (id, word) in nodes.iter().enumerate() {
        let _ = writeln!(xml, "      <node id=\"{}\" label=\"{}\" />", id, xml_escape(word));
    }
    xml.push_str("    </nodes>
    <edges>
");
    for (id, (source, target)) in edges.iter().enumerate() {
        let _ = writeln!(xml, "      <edge id=\"{}\" source=\"{}\" target=\"{}\" />", id, source, target);
    }
    xml.push_str("    </edges>
  </graph>
</gexf>
");
    xml
}

pub fn write_neighbor_graph(path: &Path, neighbors: &WordNeighbors) -> Result<()> {
    write_text(path, &neighbor_graph_gexf(neighbors))
}

fn string_array<'a>(items: impl IntoIterator<Item = &'a String>) -> Value {
    Value::Array(items.into_iter().map(|s| Value::String(s.clone())).collect())
}

/// JSON object word → neighbor array, keys in analyzed-word order.
pub fn neighbors_json(neighbors: &WordNeighbors) -> Map<String, Value> {
    neighbors
        .iter()
        .map(|(word, list)| (word.to_string(), string_array(list.iter())))
        .collect()
}

pub fn save_neighbors_json(output_dir: &Path, file_stem: &str, neighbors: &WordNeighbors) -> Result<PathBuf> {
    save_output(output_dir, file_stem, &neighbors_json(neighbors))
}

/// Reads back a neighbor JSON object written by `save_neighbors_json`.
pub fn read_neighbors_json(path: &Path) -> Result<WordNeighbors> {

    let doc = read_input::<Map<String, Value>>(path)?;
    let mut entries = Vec::with_capacity(doc.len());
    for (word, value) in doc {
        let list = value
            .as_array()
            .ok_or_else(|| ManifoldError::Config(format!("neighbors of '{}' are not an array", word)))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ManifoldError::Config(format!("neighbor of '{}' is not a string", word)))
            })
            .collect::<Result<Vec<String>>>()?;
        entries.push((word, list));
    }
    Ok(WordNeighbors::from_entries(entries))
}

/// Inspection maps keep the order they were built in (longest list first).
pub fn save_inspection_map(output_dir: &Path, file_stem: &str, map: &InspectionMap) -> Result<PathBuf> {
    let doc: Map<String, Value> = map
        .iter()
        .map(|(key, members)| (key.clone(), string_array(members.iter())))
        .collect();
    save_output(output_dir, file_stem, &doc)
}


#[cfg(test)]
mod tests {

    use super::*;

    fn sample() -> WordNeighbors {
        let s = |w: &str| w.to_string();
        WordNeighbors::from_entries(vec![
            (s("the"), vec![s("a"), s("cat")]),
            (s("cat"), vec![s("dog"), s("the")]),
            (s("dog"), vec![s("cat"), s("<b>")]),
        ])
    }

    #[test]
    fn text_list_has_header_and_one_line_per_word() {

        let header = ListHeader { language: "english", corpus: "toy.txt", word_types: 3, neighbors: 2 };
        let text = neighbor_list_text(&header, &sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# language: english");
        assert_eq!(lines[1], "# corpus: toy.txt");
        assert_eq!(lines[2], "# Number of word types analyzed: 3");
        assert_eq!(lines[3], "# Number of neighbors: 2");
        assert_eq!(lines[4], "");
        assert_eq!(&lines[5..], &["the a cat", "cat dog the", "dog cat <b>"]);
    }

    #[test]
    fn gexf_has_undirected_deduplicated_edges() {

        let xml = neighbor_graph_gexf(&sample());
        assert!(xml.contains("defaultedgetype=\"undirected\""));
        assert_eq!(xml.matches("<node ").count(), 5);
        // the–a, the–cat, cat–dog, dog–<b>
        assert_eq!(xml.matches("<edge ").count(), 4);
        assert!(xml.contains("label=\"&lt;b&gt;\""));
    }

    #[test]
    fn json_preserves_word_order_and_reads_back() {

        let dir = tempfile::tempdir().unwrap();
        let path = save_neighbors_json(dir.path(), "toy_nearest_neighbors", &sample()).unwrap();
        assert_eq!(path.file_name().unwrap(), "toy_nearest_neighbors.json");

        let back = read_neighbors_json(&path).unwrap();
        assert_eq!(back, sample());
    }
}

//! Parser for the raw output of the minor finders.
//!
//! A raw minor file holds zero or more blocks such as
//!
//! ```text
//! MINOR {
//!   endpoints=[
//!     segment=0 start=(12=chr1_0000012000) end=(13=chr1_0000012500)
//!     ...
//!   ]
//!   edges=[
//!   from 0 to 2, eid=7, left=(12=chr1_0000012000), right=(20=chr1_0000020000)
//!   ]
//! }
//! ```
//!
//! Blocks without endpoints or without edges are not links and are skipped,
//! as are blocks cut short (a finder killed mid-write leaves one behind).
//! Any malformed numeric field fails the whole parse.
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use log::debug;
use regex::{Captures, Regex};

use crate::consts::{LINK_BACKBONE_LEN, MINOR_SENTINEL};
use crate::errors::{KnotError, Result};
use crate::models::{Edge, Endpoint, Link, Locus};
use crate::utils::read_to_string_dynamic;

fn locus_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"\b{tag}=\(([^=()]*)=chr([^_()]*)_([^()]*)\)"))
        .expect("valid locus pattern")
}

static SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"segment=([^\s]+)").expect("valid segment pattern"));
static START_REGEX: LazyLock<Regex> = LazyLock::new(|| locus_regex("start"));
static END_REGEX: LazyLock<Regex> = LazyLock::new(|| locus_regex("end"));
static FROM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfrom\s+([^\s,]+)").expect("valid from pattern"));
static TO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bto\s+([^\s,]+)").expect("valid to pattern"));
static EID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\beid=([^\s,]+)").expect("valid eid pattern"));
static LEFT_REGEX: LazyLock<Regex> = LazyLock::new(|| locus_regex("left"));
static RIGHT_REGEX: LazyLock<Regex> = LazyLock::new(|| locus_regex("right"));

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| KnotError::LinkParse(format!("invalid {field} value: {value:?}")))
}

fn parse_locus(field: &str, caps: &Captures) -> Result<Locus> {
    let chromosome = caps[2].trim();
    if chromosome.is_empty() {
        return Err(KnotError::LinkParse(format!(
            "missing chromosome in {field} locus: {:?}",
            &caps[0]
        )));
    }
    Ok(Locus {
        id: parse_number(field, &caps[1])?,
        chromosome: chromosome.to_string(),
        position: parse_number(field, &caps[3])?,
    })
}

fn collect_numbers<T: FromStr>(regex: &Regex, field: &str, text: &str) -> Result<Vec<T>> {
    regex
        .captures_iter(text)
        .map(|caps| parse_number(field, &caps[1]))
        .collect()
}

fn collect_loci(regex: &Regex, field: &str, text: &str) -> Result<Vec<Locus>> {
    regex
        .captures_iter(text)
        .map(|caps| parse_locus(field, &caps))
        .collect()
}

/// Every field of a section is listed once per entry; fewer of some means
/// the section was cut off.
fn is_complete(lens: &[usize]) -> bool {
    lens.windows(2).all(|w| w[0] == w[1])
}

fn parse_endpoints(text: &str) -> Result<Option<Vec<Endpoint>>> {
    let segments: Vec<u32> = collect_numbers(&SEGMENT_REGEX, "segment", text)?;
    let starts = collect_loci(&START_REGEX, "start", text)?;
    let ends = collect_loci(&END_REGEX, "end", text)?;
    if !is_complete(&[segments.len(), starts.len(), ends.len()]) {
        return Ok(None);
    }

    Ok(Some(segments
        .into_iter()
        .zip(starts)
        .zip(ends)
        .map(|((segment_number, start), end)| Endpoint {
            segment_number,
            start,
            end,
        })
        .collect()))
}

fn parse_edges(text: &str) -> Result<Option<Vec<Edge>>> {
    let froms: Vec<u32> = collect_numbers(&FROM_REGEX, "from", text)?;
    let tos: Vec<u32> = collect_numbers(&TO_REGEX, "to", text)?;
    let ids: Vec<u64> = collect_numbers(&EID_REGEX, "eid", text)?;
    let lefts = collect_loci(&LEFT_REGEX, "left", text)?;
    let rights = collect_loci(&RIGHT_REGEX, "right", text)?;
    if !is_complete(&[froms.len(), tos.len(), ids.len(), lefts.len(), rights.len()]) {
        return Ok(None);
    }

    Ok(Some(froms
        .into_iter()
        .zip(tos)
        .zip(ids)
        .zip(lefts)
        .zip(rights)
        .map(|((((start_segment, end_segment), edge_id), left), right)| Edge {
            start_segment,
            end_segment,
            edge_id,
            left,
            right,
        })
        .collect()))
}

fn parse_block(block: &str) -> Result<Option<Link>> {
    let (Some(endpoints_at), Some(edges_at)) = (block.find("endpoints"), block.find("edges"))
    else {
        return Ok(None);
    };

    let endpoints_text = if endpoints_at < edges_at {
        &block[endpoints_at..edges_at]
    } else {
        ""
    };
    let (Some(endpoints), Some(edges)) = (
        parse_endpoints(endpoints_text)?,
        parse_edges(&block[edges_at..])?,
    ) else {
        debug!("Skipping truncated minor block");
        return Ok(None);
    };

    if endpoints.len() != LINK_BACKBONE_LEN || edges.is_empty() {
        return Ok(None);
    }

    Link::new(endpoints, edges).map(Some)
}

///
/// Parse every link out of a raw minor-finder output text.
///
pub fn parse_links(raw_minor_text: &str) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    for block in raw_minor_text.split(MINOR_SENTINEL) {
        if let Some(link) = parse_block(block)? {
            links.push(link);
        }
    }
    Ok(links)
}

///
/// Parse every link stored in a (optionally gzip'd) raw minor file.
///
pub fn parse_links_from_file(path: &Path) -> Result<Vec<Link>> {
    let text = read_to_string_dynamic(path)?;
    parse_links(&text).map_err(|e| match e {
        KnotError::LinkParse(message) => {
            KnotError::LinkParse(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn minor_block(offset: u64, edge_ids: &[u64]) -> String {
        let mut block = String::from("MINOR { \n  endpoints=[\n");
        for i in 0..6u64 {
            let start = offset + i * 1000;
            block.push_str(&format!(
                "    segment={i} start=({}=chr1_{:010}) end=({}=chr1_{:010}) \n",
                2 * i,
                start,
                2 * i + 1,
                start + 500
            ));
        }
        block.push_str("  ]\n  edges=[\n");
        for (k, eid) in edge_ids.iter().enumerate() {
            block.push_str(&format!(
                "  from {} to {}, eid={eid}, left=({}=chr1_{:010}), right=({}=chr1_{:010})\n",
                k,
                k + 2,
                2 * k,
                offset + k as u64 * 1000,
                2 * k + 4,
                offset + (k as u64 + 2) * 1000
            ));
        }
        block.push_str("  ]\n}\n");
        block
    }

    #[fixture]
    fn two_minors() -> String {
        format!(
            "Read graph n=40 m=52\n{}{}",
            minor_block(10_000, &[3, 8, 11]),
            minor_block(50_000, &[4, 9])
        )
    }

    #[rstest]
    fn test_parse_links(two_minors: String) {
        let links = parse_links(&two_minors).unwrap();
        assert_eq!(links.len(), 2);

        let first = &links[0];
        assert_eq!(first.endpoints().len(), 6);
        assert_eq!(first.edges().len(), 3);
        assert_eq!(first.endpoints()[0].segment_number, 0);
        assert_eq!(first.endpoints()[0].start, Locus::new(0, "1", 10_000));
        assert_eq!(first.endpoints()[5].end, Locus::new(11, "1", 15_500));
        assert_eq!(first.edges()[1].start_segment, 1);
        assert_eq!(first.edges()[1].end_segment, 3);
        assert_eq!(first.edges()[1].edge_id, 8);
        assert_eq!(first.edges()[1].left, Locus::new(2, "1", 11_000));
        assert_eq!(first.edges()[1].right, Locus::new(6, "1", 13_000));

        assert_eq!(links[1].edge_ids(), vec![4, 9]);
    }

    #[rstest]
    fn test_empty_input_has_no_links() {
        assert_eq!(parse_links("").unwrap().len(), 0);
        assert_eq!(parse_links("Read graph n=4 m=3\n").unwrap().len(), 0);
    }

    #[rstest]
    fn test_block_without_edges_is_dropped(two_minors: String) {
        let text = format!("{}{}", minor_block(90_000, &[]), two_minors);
        assert_eq!(parse_links(&text).unwrap().len(), 2);
    }

    #[rstest]
    fn test_block_without_endpoints_is_dropped() {
        let text = "MINOR {\n  endpoints=[\n  ]\n  edges=[\n  from 0 to 2, eid=1, left=(1=chr1_0000000001), right=(2=chr1_0000000002)\n  ]\n}\n";
        assert_eq!(parse_links(text).unwrap().len(), 0);
    }

    #[rstest]
    fn test_full_algorithm_blocks_are_skipped() {
        let text = "MINOR (jump_edges=3+0, max_branch_set=2, sum_branch_sets=7):  edge(0 1)=4=(chr1_0000000001 chr1_0000000002)\n";
        assert_eq!(parse_links(text).unwrap().len(), 0);
    }

    #[rstest]
    fn test_malformed_number_fails() {
        let text = minor_block(10_000, &[3]).replace("segment=2", "segment=2x");
        assert!(matches!(parse_links(&text), Err(KnotError::LinkParse(_))));

        let text = minor_block(10_000, &[3]).replace("eid=3", "eid=three");
        assert!(matches!(parse_links(&text), Err(KnotError::LinkParse(_))));
    }

    #[rstest]
    fn test_malformed_locus_fails() {
        let text = minor_block(10_000, &[3]).replacen("chr1_0000010000", "chr1_00000l0000", 1);
        assert!(matches!(parse_links(&text), Err(KnotError::LinkParse(_))));
    }

    #[rstest]
    fn test_truncated_tail_is_dropped(two_minors: String) {
        let tail = minor_block(90_000, &[5, 6]);
        let cut = tail.find("left=(2=chr1_000").unwrap() + "left=(2=chr1_000".len();
        let text = format!("{two_minors}{}", &tail[..cut]);

        let links = parse_links(&text).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].edge_ids(), vec![4, 9]);
    }

    #[rstest]
    fn test_block_cut_inside_endpoints_is_dropped(two_minors: String) {
        let tail = minor_block(90_000, &[5]);
        let cut = tail.find("segment=3").unwrap();
        let text = format!("{two_minors}{}", &tail[..cut]);

        assert_eq!(parse_links(&text).unwrap().len(), 2);
    }

    #[rstest]
    fn test_parse_links_from_file(two_minors: String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.0001.mp.raw_minors");
        std::fs::write(&path, two_minors).unwrap();

        let links = parse_links_from_file(&path).unwrap();
        assert_eq!(links.len(), 2);
    }

    #[rstest]
    fn test_parse_links_from_gzipped_file(two_minors: String) {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.0001.mp.raw_minors.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(two_minors.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let links = parse_links_from_file(&path).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].edge_ids(), vec![3, 8, 11]);
    }
}

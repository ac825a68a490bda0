use crate::error::{PackError, PackResult};
use crate::grid::Grid;
use crate::shape::Shape;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::Path;

/// One `WxH: c0 c1 ...` request: pack `counts[i]` copies of shape `i` into
/// an empty `width x height` grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub width: usize,
    pub height: usize,
    pub counts: Vec<usize>,
    pub line: usize,
}

impl Region {
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }

    pub fn total_pieces(&self) -> usize {
        self.counts.iter().fold(0, |acc, &c| acc.saturating_add(c))
    }

    /// Filled cells needed to place every requested piece.
    pub fn required_cells(&self, shapes: &[Shape]) -> usize {
        shapes
            .iter()
            .zip(&self.counts)
            .fold(0, |acc, (s, &c)| acc.saturating_add(s.cell_count().saturating_mul(c)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Puzzle {
    pub shapes: Vec<Shape>,
    pub regions: Vec<Region>,
}

impl Puzzle {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> PackResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn load_from_reader<R: Read>(mut reader: R) -> PackResult<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Parses blank-line separated sections. A section starting with `<id>:`
    /// is a shape; any other section holds region lines.
    pub fn parse(input: &str) -> PackResult<Self> {
        let mut puzzle = Puzzle::default();

        for (start, lines) in sections(input) {
            let header = lines[0];
            if let Some(id) = shape_header(header) {
                let id = id.map_err(|_| PackError::parse(start, format!("bad shape id '{}'", header)))?;
                if id != puzzle.shapes.len() {
                    return Err(PackError::parse(
                        start,
                        format!("expected shape {} but found shape {}", puzzle.shapes.len(), id),
                    ));
                }
                if lines.len() < 2 {
                    return Err(PackError::parse(start, format!("shape {} has no rows", id)));
                }
                let shape = Shape::parse(id, &lines[1..])
                    .map_err(|e| PackError::parse(start, e.to_string()))?;
                puzzle.shapes.push(shape);
            } else {
                for (offset, line) in lines.iter().enumerate() {
                    puzzle.regions.push(parse_region(start + offset, line)?);
                }
            }
        }

        puzzle.validate()?;
        Ok(puzzle)
    }

    fn validate(&self) -> PackResult<()> {
        for region in &self.regions {
            if region.counts.len() != self.shapes.len() {
                return Err(PackError::parse(
                    region.line,
                    format!(
                        "region lists {} counts but {} shapes are defined",
                        region.counts.len(),
                        self.shapes.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Groups non-empty lines into sections, tagging each with the 1-based line
/// number of its first line.
fn sections(input: &str) -> Vec<(usize, Vec<&str>)> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = 0;

    for (i, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push((start, std::mem::take(&mut current)));
            }
            continue;
        }
        if current.is_empty() {
            start = i + 1;
        }
        current.push(line);
    }
    if !current.is_empty() {
        out.push((start, current));
    }
    out
}

/// `Some(id)` if the line looks like `<digits>:` with nothing after the colon.
fn shape_header(line: &str) -> Option<Result<usize, std::num::ParseIntError>> {
    let head = line.strip_suffix(':')?;
    if head.is_empty() || !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(head.parse())
}

fn parse_region(line_no: usize, line: &str) -> PackResult<Region> {
    let (dims, counts) = line
        .split_once(':')
        .ok_or_else(|| PackError::parse(line_no, format!("expected 'WxH: counts', got '{}'", line)))?;

    let (w, h) = dims
        .trim()
        .split_once('x')
        .ok_or_else(|| PackError::parse(line_no, format!("invalid dimensions '{}'", dims.trim())))?;
    let width = parse_number(line_no, w, "width")?;
    let height = parse_number(line_no, h, "height")?;
    if width == 0 || height == 0 {
        return Err(PackError::parse(line_no, "dimensions must be non-zero"));
    }
    if width.checked_mul(height).is_none() {
        return Err(PackError::parse(line_no, format!("region {}x{} is too large", width, height)));
    }

    let counts = counts
        .split_whitespace()
        .map(|c| parse_number(line_no, c, "count"))
        .collect::<PackResult<Vec<usize>>>()?;

    Ok(Region {
        width,
        height,
        counts,
        line: line_no,
    })
}

fn parse_number(line_no: usize, s: &str, what: &str) -> PackResult<usize> {
    s.trim()
        .parse()
        .map_err(|_| PackError::parse(line_no, format!("invalid {} '{}'", what, s.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0:
###
##.
##.

1:
###
##.
.##

4x4: 0 2
12x5: 1 0
";

    #[test]
    fn test_parse_sample() {
        let puzzle = Puzzle::parse(SAMPLE).unwrap();
        assert_eq!(puzzle.shapes.len(), 2);
        assert_eq!(puzzle.shapes[0].cell_count(), 7);
        assert_eq!(puzzle.shapes[1].cell_count(), 7);
        assert_eq!(puzzle.regions.len(), 2);

        let r = &puzzle.regions[1];
        assert_eq!((r.width, r.height), (12, 5));
        assert_eq!(r.counts, vec![1, 0]);
        assert_eq!(r.line, 12);
        assert_eq!(r.required_cells(&puzzle.shapes), 7);
        assert_eq!(r.grid().area(), 60);
    }

    #[test]
    fn test_count_length_mismatch_reports_line() {
        let input = "0:\n#\n\n2x2: 1 1\n";
        match Puzzle::parse(input) {
            Err(PackError::Parse { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_dimensions() {
        assert!(Puzzle::parse("0:\n#\n\n4by4: 1\n").is_err());
        assert!(Puzzle::parse("0:\n#\n\n0x4: 1\n").is_err());
        assert!(Puzzle::parse("0:\n#\n\n4x4: one\n").is_err());
    }

    #[test]
    fn test_huge_regions_and_counts() {
        let input = format!("0:\n##\n##\n\n4x4: {}\n", usize::MAX);
        let puzzle = Puzzle::parse(&input).unwrap();
        assert_eq!(puzzle.regions[0].total_pieces(), usize::MAX);
        assert_eq!(puzzle.regions[0].required_cells(&puzzle.shapes), usize::MAX);

        let too_big = format!("0:\n#\n\n{}x2: 1\n", usize::MAX);
        assert!(matches!(
            Puzzle::parse(&too_big),
            Err(PackError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_shape_errors_surface_as_parse_errors() {
        assert!(matches!(
            Puzzle::parse("0:\n##\n#\n"),
            Err(PackError::Parse { line: 1, .. })
        ));
        assert!(Puzzle::parse("1:\n#\n").is_err());
        assert!(Puzzle::parse("0:\n").is_err());
    }

    #[test]
    fn test_reader_and_crlf() {
        let input = "0:\r\n##\r\n##\r\n\r\n2x2: 1\r\n";
        let puzzle = Puzzle::load_from_reader(input.as_bytes()).unwrap();
        assert_eq!(puzzle.shapes[0].size(), 2);
        assert_eq!(puzzle.regions[0].counts, vec![1]);
    }
}

//! Terminal world map: geotagged records projected onto a character
//! grid. Rendering is pure string building so it can be tested without
//! a terminal.

use anyhow::Result;
use comfy_table::Table;

use darkroom_index::ImageRecord;

use crate::app::App;

const MAP_WIDTH: usize = 72;
const MAP_HEIGHT: usize = 24;

// Density ramp for the heatmap, lightest to densest.
const SHADES: &[char] = &['.', ':', '+', '*', '#', '@'];

/// One distinct place with the number of images taken there.
#[derive(Clone, Debug, PartialEq)]
pub struct MapPoint {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
}

/// Group geotagged records by place name; records without a geo triple
/// are excluded.
pub fn collect_points(records: &[ImageRecord]) -> Vec<MapPoint> {
    let mut points: Vec<MapPoint> = Vec::new();
    for record in records {
        let Some(ref geo) = record.geo else { continue };
        if let Some(point) = points.iter_mut().find(|p| p.place == geo.place) {
            point.count += 1;
        } else {
            points.push(MapPoint {
                place: geo.place.clone(),
                latitude: geo.latitude,
                longitude: geo.longitude,
                count: 1,
            });
        }
    }
    points
}

/// Equirectangular projection of a coordinate onto a grid cell
/// (row, column). Clamped at the far edges.
pub fn cell(latitude: f64, longitude: f64, width: usize, height: usize) -> (usize, usize) {
    let col = ((longitude + 180.0) / 360.0 * width as f64) as usize;
    let row = ((90.0 - latitude) / 180.0 * height as f64) as usize;
    (row.min(height - 1), col.min(width - 1))
}

fn marker_char(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn blank_grid(width: usize, height: usize) -> Vec<Vec<char>> {
    let mut grid = vec![vec![' '; width]; height];
    // Equator and prime meridian as faint orientation guides.
    let (equator, meridian) = cell(0.0, 0.0, width, height);
    for c in 0..width {
        grid[equator][c] = '·';
    }
    for row in grid.iter_mut() {
        row[meridian] = '·';
    }
    grid
}

fn frame(grid: &[Vec<char>]) -> String {
    let width = grid.first().map_or(0, Vec::len);
    let horizontal = format!("+{}+", "-".repeat(width));
    let mut out = String::new();
    out.push_str(&horizontal);
    out.push('\n');
    for row in grid {
        out.push('|');
        out.extend(row.iter());
        out.push_str("|\n");
    }
    out.push_str(&horizontal);
    out
}

/// Scatter map: one lettered marker per distinct place.
pub fn render_scatter(points: &[MapPoint], width: usize, height: usize) -> String {
    let mut grid = blank_grid(width, height);
    for (i, point) in points.iter().enumerate() {
        let (row, col) = cell(point.latitude, point.longitude, width, height);
        grid[row][col] = marker_char(i);
    }
    frame(&grid)
}

/// Density map: cells shaded by how many images fall into them.
pub fn render_heatmap(points: &[MapPoint], width: usize, height: usize) -> String {
    let mut counts = vec![vec![0usize; width]; height];
    for point in points {
        let (row, col) = cell(point.latitude, point.longitude, width, height);
        counts[row][col] += point.count;
    }
    let max = counts
        .iter()
        .flatten()
        .copied()
        .max()
        .filter(|&m| m > 0)
        .unwrap_or(1);

    let mut grid = blank_grid(width, height);
    for (row, count_row) in counts.iter().enumerate() {
        for (col, &count) in count_row.iter().enumerate() {
            if count > 0 {
                let level = (count * SHADES.len()).div_ceil(max).min(SHADES.len());
                grid[row][col] = SHADES[level - 1];
            }
        }
    }
    frame(&grid)
}

pub fn run(app: &App, heat: bool) -> Result<()> {
    let points = collect_points(app.index.records());
    if points.is_empty() {
        println!("No geotagged images yet. Add locations via \"Change info\".");
        return Ok(());
    }

    if heat {
        println!("{}", render_heatmap(&points, MAP_WIDTH, MAP_HEIGHT));
        let total: usize = points.iter().map(|p| p.count).sum();
        println!("{total} geotagged images across {} places.", points.len());
    } else {
        println!("{}", render_scatter(&points, MAP_WIDTH, MAP_HEIGHT));
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["", "Place", "Images", "Coordinates"]);
        for (i, point) in points.iter().enumerate() {
            table.add_row(vec![
                marker_char(i).to_string(),
                point.place.clone(),
                point.count.to_string(),
                format!("{:.4}, {:.4}", point.latitude, point.longitude),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkroom_index::GeoTag;

    fn geo_record(filename: &str, geo: Option<GeoTag>) -> ImageRecord {
        ImageRecord {
            filename: filename.to_string(),
            event: "Trip".to_string(),
            format: "JPEG".to_string(),
            width: 100,
            height: 100,
            megapixels: 0.01,
            channels: 3,
            mode: "RGB".to_string(),
            timestamp: 0.0,
            creation: "2023-01-01 00:00:00".to_string(),
            date_time: None,
            date: None,
            edited: false,
            geo,
        }
    }

    fn paris() -> GeoTag {
        GeoTag {
            latitude: 48.8566,
            longitude: 2.3522,
            place: "Paris".to_string(),
        }
    }

    #[test]
    fn projection_corners_and_center() {
        assert_eq!(cell(90.0, -180.0, 72, 24), (0, 0));
        assert_eq!(cell(-90.0, 180.0, 72, 24), (23, 71));
        assert_eq!(cell(0.0, 0.0, 72, 24), (12, 36));
    }

    #[test]
    fn collect_groups_by_place_and_skips_untagged() {
        let records = vec![
            geo_record("a.jpg", Some(paris())),
            geo_record("b.jpg", None),
            geo_record("c.jpg", Some(paris())),
        ];
        let points = collect_points(&records);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].place, "Paris");
        assert_eq!(points[0].count, 2);
    }

    #[test]
    fn scatter_places_lettered_markers() {
        let points = collect_points(&[geo_record("a.jpg", Some(paris()))]);
        let map = render_scatter(&points, 72, 24);
        assert!(map.contains('A'));
        assert!(map.starts_with('+'));

        // The marker sits where the projection says.
        let (row, col) = cell(48.8566, 2.3522, 72, 24);
        let lines: Vec<&str> = map.lines().collect();
        let chars: Vec<char> = lines[row + 1].chars().collect();
        assert_eq!(chars[col + 1], 'A');
    }

    #[test]
    fn marker_letters_wrap_around() {
        assert_eq!(marker_char(0), 'A');
        assert_eq!(marker_char(25), 'Z');
        assert_eq!(marker_char(26), 'A');
    }

    #[test]
    fn heatmap_shades_by_density() {
        let crowded = paris();
        let tokyo = GeoTag {
            latitude: 35.6762,
            longitude: 139.6503,
            place: "Tokyo".to_string(),
        };

        let mut records = vec![geo_record("t.jpg", Some(tokyo))];
        for i in 0..10 {
            records.push(geo_record(&format!("p{i}.jpg"), Some(crowded.clone())));
        }
        let map = render_heatmap(&collect_points(&records), 72, 24);

        // Densest cell gets the darkest shade; the single-image cell a
        // lighter one.
        assert!(map.contains('@'));
        assert!(SHADES[..SHADES.len() - 1].iter().any(|&s| map.contains(s)));
    }

    #[test]
    fn empty_points_render_blank_grid() {
        let map = render_scatter(&[], 10, 4);
        assert_eq!(map.lines().count(), 6);
        assert!(!map.contains('A'));
    }
}

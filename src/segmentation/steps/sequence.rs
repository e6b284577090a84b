use crate::geometry::BoundingBox;
use imageproc::contours::Contour;

/// Boxes of one visual line, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    boxes: Vec<BoundingBox>,
}

impl TextLine {
    fn new(mut boxes: Vec<BoundingBox>) -> Self {
        boxes.sort_by_key(|b| b.x);
        Self { boxes }
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Smallest top edge in the line
    pub fn top(&self) -> i32 {
        self.boxes.iter().map(|b| b.y).min().unwrap_or(0)
    }
}

/// Bounding rectangles of all non-empty contours, in contour order
pub fn boxes_from_contours(contours: &[Contour<i32>]) -> Vec<BoundingBox> {
    contours.iter().filter_map(BoundingBox::from_contour).collect()
}

/// Split boxes into lines by top edge.
///
/// Boxes are stably sorted by `y` and walked once; a box whose top edge is
/// more than `tolerance` away from the previous box's starts a new line.
/// Split lines are never merged back.
pub fn group_lines(mut boxes: Vec<BoundingBox>, tolerance: i32) -> Vec<TextLine> {
    boxes.sort_by_key(|b| b.y);

    let mut lines = Vec::new();
    let mut current: Vec<BoundingBox> = Vec::new();
    let mut current_y = 0;

    for bbox in boxes {
        if !current.is_empty() && (bbox.y - current_y).abs() > tolerance {
            lines.push(TextLine::new(std::mem::take(&mut current)));
        }
        current_y = bbox.y;
        current.push(bbox);
    }
    if !current.is_empty() {
        lines.push(TextLine::new(current));
    }

    lines
}

/// Flatten lines, in formation order, into one reading-order sequence
pub fn reading_order(lines: &[TextLine]) -> Vec<BoundingBox> {
    lines.iter().flat_map(|line| line.boxes().iter().copied()).collect()
}

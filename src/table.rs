/// One flow between two named nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub source: String,
    pub target: String,
    pub value: f64,
}

impl EdgeRow {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// An ordered list of flows, as read from one spreadsheet sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeTable {
    pub rows: Vec<EdgeRow>,
}

impl EdgeTable {
    pub fn new(rows: Vec<EdgeRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a copy with every zero-valued row removed, keeping row order.
    ///
    /// A flow of width zero cannot be drawn and makes the layout engine fail,
    /// so rows where any column evaluates to zero are dropped up front. Node
    /// cells count as zero when the cell holds a literal numeric zero (the
    /// spreadsheet reader keeps numeric labels as text). Non-finite values
    /// cannot be drawn either and are dropped as well.
    pub fn sanitized(&self) -> EdgeTable {
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.value != 0.0
                    && row.value.is_finite()
                    && !cell_is_zero(&row.source)
                    && !cell_is_zero(&row.target)
            })
            .cloned()
            .collect();
        EdgeTable { rows }
    }
}

fn cell_is_zero(cell: &str) -> bool {
    matches!(cell.trim().parse::<f64>(), Ok(v) if v == 0.0)
}

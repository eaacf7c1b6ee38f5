use crate::rules::RuleView;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GridNode {
    pub x: i64,
    pub y: i64,
    pub z: u8,
    pub obstacle: bool,
    pub vertical_block: bool,
    pub visited: bool,
    pub step: Option<u32>,
    pub up: Option<NodeId>,
    pub down: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub top: Option<NodeId>,
    pub bottom: Option<NodeId>,
}

impl GridNode {
    fn new(x: i64, y: i64, z: u8, vertical_block: bool) -> Self {
        Self {
            x,
            y,
            z,
            obstacle: false,
            vertical_block,
            visited: false,
            step: None,
            up: None,
            down: None,
            left: None,
            right: None,
            top: None,
            bottom: None,
        }
    }
}

struct Layer {
    cols: Vec<i64>,
    rows: Vec<i64>,
    /// `nodes[row][col]`.
    nodes: Vec<Vec<NodeId>>,
}

impl Layer {
    fn col_of(&self, x: i64) -> Option<usize> {
        self.cols.binary_search(&x).ok()
    }

    fn row_of(&self, y: i64) -> Option<usize> {
        self.rows.binary_search(&y).ok()
    }
}

/// Owns the 3D routing grid for a single net: a list of layers, each a
/// list of rows, each an ordered list of nodes sharing `y`. Rebuilt
/// fresh per net.
pub struct GridGraph {
    arena: Vec<GridNode>,
    layers: Vec<Layer>,
}

fn build_axis(lo: f64, hi: f64, step: f64) -> Vec<i64> {
    let mut values = Vec::new();
    let mut v = lo;
    while v <= hi + 1e-6 {
        let rounded = v.round() as i64;
        if values.last().copied() != Some(rounded) {
            values.push(rounded);
        }
        v += step;
    }
    if values.len() < 2 {
        values.push(hi.round() as i64);
        values.dedup();
    }
    values
}

impl GridGraph {
    /// Builds the grid for one net: bounding box over `endpoints`,
    /// expanded per layer by `extension_pitches * pitch(k) /
    /// pitch_adjust`, then aligned so every endpoint coincides with a
    /// node on every layer.
    pub fn build(
        rules: &RuleView,
        endpoints: &[(i64, i64, u8)],
        pitch_adjust: u32,
        extension_pitches: f64,
    ) -> Self {
        let x0 = endpoints.iter().map(|p| p.0).min().unwrap_or(0);
        let x1 = endpoints.iter().map(|p| p.0).max().unwrap_or(0);
        let y0 = endpoints.iter().map(|p| p.1).min().unwrap_or(0);
        let y1 = endpoints.iter().map(|p| p.1).max().unwrap_or(0);

        let mut arena = Vec::new();
        let mut layers = Vec::with_capacity(rules.num_layers as usize);

        for k in 0..rules.num_layers {
            let spacing = rules.pitch(k) / pitch_adjust as f64;
            let margin = extension_pitches * rules.pitch(k) / pitch_adjust as f64;

            let cols = build_axis(x0 as f64 - margin, x1 as f64 + margin, spacing);
            let rows = build_axis(y0 as f64 - margin, y1 as f64 + margin, spacing);

            let mut nodes = Vec::with_capacity(rows.len());
            for &y in &rows {
                let mut row = Vec::with_capacity(cols.len());
                for &x in &cols {
                    let id = NodeId(arena.len() as u32);
                    arena.push(GridNode::new(x, y, k, false));
                    row.push(id);
                }
                nodes.push(row);
            }

            layers.push(Layer { cols, rows, nodes });
        }

        let mut graph = Self { arena, layers };
        graph.extend_grid_node(endpoints);
        graph
    }

    /// For every endpoint, inserts a new column/row at every layer if
    /// the endpoint's `x`/`y` does not already coincide with a node,
    /// so that `top`/`bottom` via links remain possible from that
    /// position on any layer.
    fn extend_grid_node(&mut self, endpoints: &[(i64, i64, u8)]) {
        for &(px, py, _pz) in endpoints {
            for layer_idx in 0..self.layers.len() {
                if self.layers[layer_idx].col_of(px).is_none() {
                    self.insert_column(layer_idx, px);
                }
            }
            for layer_idx in 0..self.layers.len() {
                if self.layers[layer_idx].row_of(py).is_none() {
                    self.insert_row(layer_idx, py);
                }
            }
        }
    }

    fn insert_column(&mut self, layer_idx: usize, x: i64) {
        let insert_at = self.layers[layer_idx].cols.partition_point(|&c| c < x);
        self.layers[layer_idx].cols.insert(insert_at, x);

        let z = layer_idx as u8;
        let num_rows = self.layers[layer_idx].rows.len();
        for row in 0..num_rows {
            let y = self.layers[layer_idx].rows[row];
            let id = NodeId(self.arena.len() as u32);
            self.arena.push(GridNode::new(x, y, z, true));
            self.layers[layer_idx].nodes[row].insert(insert_at, id);
        }
    }

    fn insert_row(&mut self, layer_idx: usize, y: i64) {
        let insert_at = self.layers[layer_idx].rows.partition_point(|&r| r < y);
        self.layers[layer_idx].rows.insert(insert_at, y);

        let z = layer_idx as u8;
        let cols = self.layers[layer_idx].cols.clone();
        let mut row = Vec::with_capacity(cols.len());
        for x in cols {
            let id = NodeId(self.arena.len() as u32);
            self.arena.push(GridNode::new(x, y, z, true));
            row.push(id);
        }
        self.layers[layer_idx].nodes.insert(insert_at, row);
    }

    pub fn node(&self, id: NodeId) -> &GridNode {
        &self.arena[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GridNode {
        &mut self.arena[id.index()]
    }

    pub fn num_nodes(&self) -> usize {
        self.arena.len()
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn all_node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.arena.len() as u32).map(NodeId)
    }

    /// Finds the node at the exact `(x, y)` on `layer`, if one exists.
    pub fn find_node(&self, layer: u8, x: i64, y: i64) -> Option<NodeId> {
        let l = &self.layers[layer as usize];
        let row = l.row_of(y)?;
        let col = l.col_of(x)?;
        Some(l.nodes[row][col])
    }

    /// Every node whose `(x, y)` falls in the closed rectangle
    /// `[x0,x1] x [y0,y1]` on `layer`.
    pub fn nodes_in_rect(&self, layer: u8, x0: i64, x1: i64, y0: i64, y1: i64) -> Vec<NodeId> {
        let l = &self.layers[layer as usize];
        let col_lo = l.cols.partition_point(|&c| c < x0);
        let col_hi = l.cols.partition_point(|&c| c <= x1);
        let row_lo = l.rows.partition_point(|&r| r < y0);
        let row_hi = l.rows.partition_point(|&r| r <= y1);

        let mut out = Vec::new();
        for row in l.nodes.iter().take(row_hi).skip(row_lo) {
            out.extend(row[col_lo..col_hi].iter().copied());
        }
        out
    }

    /// Wires every non-obstacle node to its in-plane neighbors
    /// (skipping obstacle neighbors), and to its `top`/`bottom`
    /// neighbor iff both nodes are non-obstacle, neither is
    /// `vertical_block`ed, and their `(x, y)` match exactly.
    pub fn grid_connections(&mut self) {
        for layer_idx in 0..self.layers.len() {
            let num_rows = self.layers[layer_idx].nodes.len();
            for row in 0..num_rows {
                let num_cols = self.layers[layer_idx].nodes[row].len();
                for col in 0..num_cols {
                    let id = self.layers[layer_idx].nodes[row][col];
                    if self.node(id).obstacle {
                        continue;
                    }

                    if col > 0 {
                        let left = self.layers[layer_idx].nodes[row][col - 1];
                        if !self.node(left).obstacle {
                            self.node_mut(id).left = Some(left);
                        }
                    }
                    if col + 1 < num_cols {
                        let right = self.layers[layer_idx].nodes[row][col + 1];
                        if !self.node(right).obstacle {
                            self.node_mut(id).right = Some(right);
                        }
                    }
                    if row > 0 {
                        let down = self.layers[layer_idx].nodes[row - 1][col];
                        if !self.node(down).obstacle {
                            self.node_mut(id).down = Some(down);
                        }
                    }
                    if row + 1 < num_rows {
                        let up = self.layers[layer_idx].nodes[row + 1][col];
                        if !self.node(up).obstacle {
                            self.node_mut(id).up = Some(up);
                        }
                    }
                }
            }
        }

        for z in 0..self.layers.len().saturating_sub(1) {
            let upper = z + 1;
            let ids: Vec<NodeId> = self.layers[z].nodes.iter().flatten().copied().collect();
            for id in ids {
                let node = *self.node(id);
                if node.obstacle || node.vertical_block {
                    continue;
                }
                if let Some(top_id) = self.find_node(upper as u8, node.x, node.y) {
                    let top_node = *self.node(top_id);
                    if !top_node.obstacle && !top_node.vertical_block {
                        self.node_mut(id).top = Some(top_id);
                        self.node_mut(top_id).bottom = Some(id);
                    }
                }
            }
        }
    }

    /// Deterministic order: up, down, left, right, top, bottom. Top
    /// and bottom are omitted when the node itself is `vertical_block`ed.
    pub fn get_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let n = self.node(id);
        let mut out = Vec::with_capacity(6);
        out.extend(n.up);
        out.extend(n.down);
        out.extend(n.left);
        out.extend(n.right);
        if !n.vertical_block {
            out.extend(n.top);
            out.extend(n.bottom);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icroute_common::db::tech::Tech;

    fn small_rules(tech: &Tech) -> RuleView<'_> {
        RuleView::new(tech, 2).unwrap()
    }

    fn sample_tech() -> Tech {
        let mut t = Tech::new(10.0, 1.0);
        t.set_width("poly", 20.0).set_spacing("poly", "poly", 20.0);
        t.set_width("metal1", 20.0).set_spacing("metal1", "metal1", 20.0);
        t
    }

    #[test]
    fn alignment_inserts_on_every_layer() {
        let tech = sample_tech();
        let rules = small_rules(&tech);
        let endpoints = [(0, 0, 0), (37, 0, 1)];
        let graph = GridGraph::build(&rules, &endpoints, 1, 5.0);
        for layer in 0..graph.num_layers() as u8 {
            assert!(graph.find_node(layer, 37, 0).is_some());
        }
    }

    #[test]
    fn off_pitch_endpoint_is_marked_vertical_block_and_reachable() {
        let tech = sample_tech();
        let rules = small_rules(&tech);
        let endpoints = [(0, 0, 0), (37, 0, 0)];
        let mut graph = GridGraph::build(&rules, &endpoints, 1, 5.0);
        graph.grid_connections();

        let inserted = graph.find_node(0, 37, 0).expect("endpoint column inserted");
        assert!(graph.node(inserted).vertical_block);

        let has_neighbor = graph.get_neighbors(inserted).iter().any(|&n| {
            let node = graph.node(n);
            node.z == 0 && node.y == 0
        });
        assert!(has_neighbor, "off-pitch node should have a native-pitch neighbor on its row");
    }

    #[test]
    fn grid_connections_are_symmetric() {
        let tech = sample_tech();
        let rules = small_rules(&tech);
        let endpoints = [(0, 0, 0), (40, 40, 0)];
        let mut graph = GridGraph::build(&rules, &endpoints, 1, 5.0);
        graph.grid_connections();

        for id in graph.all_node_ids() {
            let node = *graph.node(id);
            if let Some(up) = node.up {
                assert_eq!(graph.node(up).down, Some(id));
            }
            if let Some(top) = node.top {
                let top_node = graph.node(top);
                assert_eq!(top_node.x, node.x);
                assert_eq!(top_node.y, node.y);
                assert_eq!(top_node.z, node.z + 1);
                assert_eq!(top_node.bottom, Some(id));
            }
        }
    }
}

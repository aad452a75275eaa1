use std::collections::{HashMap, VecDeque};

use crate::table::EdgeTable;

/// Geometry inputs for one layout run.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub width: f32,
    pub height: f32,
    pub node_width: f32,
    pub node_padding: f32,
}

#[derive(Debug, Clone)]
pub struct SankeyNode {
    pub name: String,
    pub rank: usize,
    /// Throughput of the node, max of incoming and outgoing flow.
    pub total: f64,
    pub x: f32,
    pub y: f32,
    pub height: f32,
    /// Filled in by the diagram builder once the palette is resolved.
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub thickness: f32,
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct SankeyLayout {
    pub width: f32,
    pub height: f32,
    pub node_width: f32,
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

/// Computes node and ribbon geometry for one edge table.
///
/// Nodes are ranked left to right by longest path from a source, stacked top
/// to bottom within a rank in first-seen order, and scaled so the fullest
/// rank fits the plot height. The caller is expected to pass a sanitized
/// table; zero-width flows would produce invisible ribbons.
pub fn compute_sankey_layout(table: &EdgeTable, opts: &LayoutOptions) -> SankeyLayout {
    let mut names: Vec<String> = Vec::new();
    let mut name_to_idx: HashMap<String, usize> = HashMap::new();

    struct LinkData {
        from: usize,
        to: usize,
        value: f64,
    }

    let mut links_data: Vec<LinkData> = Vec::new();
    for row in &table.rows {
        let from = intern(&row.source, &mut names, &mut name_to_idx);
        let to = intern(&row.target, &mut names, &mut name_to_idx);
        links_data.push(LinkData {
            from,
            to,
            value: row.value.abs(),
        });
    }

    let node_count = names.len();
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree = vec![0usize; node_count];
    let mut in_total = vec![0.0f64; node_count];
    let mut out_total = vec![0.0f64; node_count];
    for (idx, link) in links_data.iter().enumerate() {
        outgoing[link.from].push(idx);
        incoming[link.to].push(idx);
        indegree[link.to] += 1;
        out_total[link.from] += link.value;
        in_total[link.to] += link.value;
    }

    // Longest-path ranks via Kahn's algorithm. On a cycle the unreached
    // nodes keep rank 0, which still draws, just not prettily.
    let mut ranks = vec![0usize; node_count];
    let mut indegree_work = indegree.clone();
    let mut queue: VecDeque<usize> = indegree_work
        .iter()
        .enumerate()
        .filter_map(|(idx, deg)| (*deg == 0).then_some(idx))
        .collect();
    let mut topo = Vec::with_capacity(node_count);
    while let Some(node) = queue.pop_front() {
        topo.push(node);
        for &link_idx in &outgoing[node] {
            let to = links_data[link_idx].to;
            indegree_work[to] -= 1;
            if indegree_work[to] == 0 {
                queue.push_back(to);
            }
        }
    }
    if topo.len() == node_count {
        for &node in &topo {
            for &link_idx in &outgoing[node] {
                let to = links_data[link_idx].to;
                ranks[to] = ranks[to].max(ranks[node] + 1);
            }
        }
    }

    let num_ranks = ranks.iter().copied().max().unwrap_or(0) + 1;
    let gap_x = if num_ranks > 1 {
        ((opts.width - opts.node_width * num_ranks as f32) / (num_ranks - 1) as f32).max(0.0)
    } else {
        0.0
    };

    let totals: Vec<f64> = (0..node_count)
        .map(|idx| in_total[idx].max(out_total[idx]).max(f64::MIN_POSITIVE))
        .collect();

    let mut rank_nodes: Vec<Vec<usize>> = vec![Vec::new(); num_ranks];
    for idx in 0..node_count {
        rank_nodes[ranks[idx]].push(idx);
    }

    // Scale chosen so the fullest rank, padding included, fits the height.
    let mut scale = f64::INFINITY;
    for nodes_in_rank in &rank_nodes {
        if nodes_in_rank.is_empty() {
            continue;
        }
        let rank_total: f64 = nodes_in_rank.iter().map(|&idx| totals[idx]).sum();
        let available =
            (opts.height - opts.node_padding * (nodes_in_rank.len() - 1) as f32).max(1.0);
        scale = scale.min(available as f64 / rank_total);
    }
    if !scale.is_finite() {
        scale = 1.0;
    }

    let mut node_x = vec![0.0f32; node_count];
    let mut node_y = vec![0.0f32; node_count];
    let mut node_h = vec![0.0f32; node_count];
    for nodes_in_rank in &rank_nodes {
        let mut y = 0.0f32;
        for &idx in nodes_in_rank {
            node_x[idx] = ranks[idx] as f32 * (opts.node_width + gap_x);
            node_y[idx] = y;
            node_h[idx] = (totals[idx] * scale) as f32;
            y += node_h[idx] + opts.node_padding;
        }
    }

    // Ribbon slots: outgoing links leave a node ordered by target position,
    // incoming links arrive ordered by source position, offsets accumulate.
    let thickness: Vec<f32> = links_data
        .iter()
        .map(|link| (link.value * scale) as f32)
        .collect();
    let mut out_offset = vec![0.0f32; links_data.len()];
    let mut in_offset = vec![0.0f32; links_data.len()];
    for node in 0..node_count {
        let mut order = outgoing[node].clone();
        order.sort_by(|&a, &b| {
            let ta = links_data[a].to;
            let tb = links_data[b].to;
            node_y[ta]
                .partial_cmp(&node_y[tb])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(ta.cmp(&tb))
        });
        let mut acc = 0.0f32;
        for link_idx in order {
            out_offset[link_idx] = acc;
            acc += thickness[link_idx];
        }

        let mut order = incoming[node].clone();
        order.sort_by(|&a, &b| {
            let sa = links_data[a].from;
            let sb = links_data[b].from;
            node_y[sa]
                .partial_cmp(&node_y[sb])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(sa.cmp(&sb))
        });
        let mut acc = 0.0f32;
        for link_idx in order {
            in_offset[link_idx] = acc;
            acc += thickness[link_idx];
        }
    }

    let nodes: Vec<SankeyNode> = (0..node_count)
        .map(|idx| SankeyNode {
            name: names[idx].clone(),
            rank: ranks[idx],
            total: totals[idx],
            x: node_x[idx],
            y: node_y[idx],
            height: node_h[idx],
            color: String::new(),
        })
        .collect();

    let links: Vec<SankeyLink> = links_data
        .iter()
        .enumerate()
        .map(|(idx, link)| SankeyLink {
            source: link.from,
            target: link.to,
            value: link.value,
            thickness: thickness[idx],
            start: (
                node_x[link.from] + opts.node_width,
                node_y[link.from] + out_offset[idx] + thickness[idx] / 2.0,
            ),
            end: (
                node_x[link.to],
                node_y[link.to] + in_offset[idx] + thickness[idx] / 2.0,
            ),
            color: String::new(),
            label: String::new(),
        })
        .collect();

    SankeyLayout {
        width: opts.width,
        height: opts.height,
        node_width: opts.node_width,
        nodes,
        links,
    }
}

fn intern(name: &str, names: &mut Vec<String>, index: &mut HashMap<String, usize>) -> usize {
    if let Some(&idx) = index.get(name) {
        return idx;
    }
    names.push(name.to_string());
    index.insert(name.to_string(), names.len() - 1);
    names.len() - 1
}

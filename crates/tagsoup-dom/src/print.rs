use crate::NodeId;
use crate::node::NodeKind;
use crate::tree::DomTree;

/// Print a node and its subtree to stdout, one node per line.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match node.kind() {
        NodeKind::Document => {
            println!("{prefix}Document");
        }
        NodeKind::Element => {
            let source = tree.source();
            let attrs: Vec<String> = node
                .attributes()
                .iter()
                .map(|a| match a.value(source) {
                    Some(v) => format!("{}=\"{v}\"", a.name(source)),
                    None => a.name(source).to_owned(),
                })
                .collect();
            let open = if node.is_closed() { "" } else { " (open)" };
            if attrs.is_empty() {
                println!("{prefix}<{}>{open}", tree.raw_name(id));
            } else {
                println!("{prefix}<{} {}>{open}", tree.raw_name(id), attrs.join(" "));
            }
        }
        NodeKind::Text => {
            let data = tree.text(id).unwrap_or_default();
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{display}\"");
        }
        NodeKind::Comment => {
            println!("{prefix}{}", tree.text(id).unwrap_or_default());
        }
    }
    for &child_id in tree.children(id) {
        print_tree(tree, child_id, indent + 1);
    }
}

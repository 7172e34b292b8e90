use avl_tree::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    for value in 1..=6 {
        tree.insert(value);
    }

    println!("Level-order traversal:");
    for value in tree.levelorder() {
        println!("Value: {}", value);
    }
}

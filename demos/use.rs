use avl_tree::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    tree.insert("delta");
    tree.insert("alpha");
    tree.insert("charlie");
    tree.insert("charlie");
    tree.insert("bravo");
    tree.insert("echo");
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.get(&"bravo"), Some(&"bravo"));
    assert_eq!(tree.remove(&"bravo"), Some("bravo"));
    assert!(!tree.contains(&"bravo"));

    println!("height: {:?}", tree.height());
    println!("preorder: {:?}", tree.preorder());
    println!("inorder: {:?}", tree.inorder());
    println!("postorder: {:?}", tree.postorder());
    println!("{tree:?}");
}

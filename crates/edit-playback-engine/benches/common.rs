// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_source_text(size: usize) -> String {
    let base = "fn example(value: usize) -> usize {\n    // double it\n    let doubled = value * 2;\n    println!(\"{doubled}\");\n    doubled\n}\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_prose(words: usize) -> String {
    let vocabulary = ["lorem", "ipsum", "dolor", "sit", "amet,", "naïve", "café\n"];
    let mut content = String::new();
    for i in 0..words {
        content.push_str(vocabulary[i % vocabulary.len()]);
        if !content.ends_with('\n') {
            content.push(' ');
        }
    }
    content
}

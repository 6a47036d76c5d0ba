use polybox::{boxes, Boxed, Boxes};

fn main() {
    divan::main();
}

#[divan::bench]
fn box_integer() {
    divan::black_box({
        let boxed = Boxed::new(divan::black_box(42i32));
        boxed
    });
}

#[divan::bench]
fn box_string() {
    let text = String::from("a string of some length");
    divan::black_box({
        let boxed = Boxed::new(divan::black_box(&text));
        boxed
    });
}

#[divan::bench]
fn unbox_integer() {
    let boxed = Boxed::new(42i64);
    divan::black_box(divan::black_box(&boxed).unbox::<i64>());
}

#[divan::bench]
fn equals_same_type() {
    let lhs = Boxed::new("left");
    let rhs = Boxed::new("right");
    divan::black_box(divan::black_box(&lhs).equals(divan::black_box(&rhs)));
}

#[divan::bench]
fn equals_mixed_numbers() {
    let lhs = Boxed::new(3u8);
    let rhs = Boxed::new(3.0f64);
    divan::black_box(divan::black_box(&lhs).equals(divan::black_box(&rhs)));
}

#[divan::bench]
fn display_float() {
    let boxed = Boxed::new(2.5f64);
    divan::black_box(divan::black_box(&boxed).to_string());
}

#[divan::bench]
fn build_boxes() {
    divan::black_box({
        let args: Boxes<'_> = boxes![1, "two", 3.0, 'c', true];
        args
    });
}

#[divan::bench]
fn vec_of_trait_objects() {
    divan::black_box({
        let args: Vec<Box<dyn std::fmt::Display>> = vec![
            Box::new(1),
            Box::new("two"),
            Box::new(3.0),
            Box::new('c'),
            Box::new(true),
        ];
        args
    });
}

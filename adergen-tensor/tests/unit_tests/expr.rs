use adergen_tensor::{Expr, Scalar, Tensor};

#[test]
fn products_and_sums_are_flattened() {
    let a = Tensor::new("A", [2, 2]);
    let b = Tensor::new("B", [2, 2]);
    let c = Tensor::new("C", [2, 2]);

    let product = a.at("ij") * b.at("jk") * c.at("kl");
    match &product {
        Expr::Product(factors) => assert_eq!(factors.len(), 3),
        other => panic!("expected product, got {:?}", other),
    }

    let mut sum = Expr::sum();
    sum += a.at("il");
    sum += product;
    sum = sum + c.at("il");
    match &sum {
        Expr::Sum(terms) => assert_eq!(terms.len(), 3),
        other => panic!("expected sum, got {:?}", other),
    }
}

#[test]
fn equation_display() {
    let q = Tensor::new("Q", [4, 9]);
    let k = Tensor::new("kDivM(0)", [4, 4]);
    let star = Tensor::new("star(0)", [9, 9]);
    let equation = q
        .access("kp")
        .assign(q.at("kp") + k.at("kl") * q.at("lq") * star.at("qp"));
    assert_eq!(equation.to_string(), "Q[kp] <= Q[kp] + kDivM(0)[kl] * Q[lq] * star(0)[qp]");

    let scaled = q.access("kp").assign(Scalar::new("power") * (q.at("kp") + q.at("kp")));
    assert_eq!(scaled.to_string(), "Q[kp] <= power * (Q[kp] + Q[kp])");
}

#[test]
fn equation_tensors_are_listed_once_in_order() {
    let q = Tensor::new("Q", [4, 9]);
    let i = Tensor::new("I", [4, 9]);
    let k = Tensor::new("K", [4, 4]);
    let equation = q.access("kp").assign(q.at("kp") + k.at("kl") * i.at("lp") + i.at("kp"));
    let names: Vec<_> = equation.tensors().iter().map(|t| t.name().to_string()).collect();
    assert_eq!(names, vec!["Q", "K", "I"]);
}

#[test]
fn equations_compare_structurally() {
    let make = || {
        let a = Tensor::new("A", [3, 3]);
        let x = Tensor::new("x", [3]);
        a.access("ij").assign(a.at("ik") * x.at("k") * x.at("j"))
    };
    assert_eq!(make(), make());
}

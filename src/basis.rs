//! Sizes of the modal bases on the reference tetrahedron and its faces.

/// Number of basis functions of a complete polynomial space of degree `order - 1` in 3D.
pub fn number_of_3d_basis_functions(order: usize) -> usize {
    order * (order + 1) * (order + 2) / 6
}

/// Number of basis functions of a complete polynomial space of degree `order - 1` in 2D.
pub fn number_of_2d_basis_functions(order: usize) -> usize {
    order * (order + 1) / 2
}

/// Number of points of the tensor-product quadrature rule used for projections.
pub fn number_of_3d_quadrature_points(order: usize) -> usize {
    (order + 1).pow(3)
}

/// Number of faces of a tetrahedron.
pub const NUMBER_OF_FACES: usize = 4;

/// Number of relative vertex orderings with which two tetrahedra can share a face.
pub const NUMBER_OF_FACE_ROTATIONS: usize = 3;

/// Number of spatial dimensions.
pub const DIMENSIONS: usize = 3;

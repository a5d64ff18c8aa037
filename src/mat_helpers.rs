use cgmath::{Deg, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};
use imgui_glium_renderer::imgui::Ui;

pub const FOV_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

pub fn vec_from_array3(v: &[f32; 3]) -> Vector3<f32> {
    Vector3::new(v[0], v[1], v[2])
}

pub fn mat4_array(m: &Matrix4<f32>) -> [[f32; 4]; 4] {
    (*m).into()
}

pub fn mat3_array(m: &Matrix3<f32>) -> [[f32; 3]; 3] {
    (*m).into()
}

/// Inverse transpose of the model matrix's upper 3x3, for transforming normals.
/// Singular matrices fall back to identity.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    upper
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix3::identity)
}

pub fn perspective_projection(window_width: u32, window_height: u32) -> Matrix4<f32> {
    let aspect_ratio = window_width as f32 / window_height.max(1) as f32;
    cgmath::perspective(Deg(FOV_DEGREES), aspect_ratio, Z_NEAR, Z_FAR)
}

/// Translate, then rotate around `axis` by `angle`, then scale uniformly.
pub fn model_matrix(
    position: Vector3<f32>,
    axis: Vector3<f32>,
    angle: Deg<f32>,
    scale: f32,
) -> Matrix4<f32> {
    use cgmath::InnerSpace;
    let rotation = if axis.magnitude2() > 0.0 {
        Matrix4::from_axis_angle(axis.normalize(), angle)
    } else {
        Matrix4::identity()
    };
    Matrix4::from_translation(position) * rotation * Matrix4::from_scale(scale)
}

pub fn print_mat(m: &Matrix4<f32>) -> String {
    let mut res: String = "".to_string();
    res += &*format!("\n{:?}", m.row(0));
    res += &*format!("\n{:?}", m.row(1));
    res += &*format!("\n{:?}", m.row(2));
    res += &*format!("\n{:?}", m.row(3));
    res
}

pub fn print_mat_ui(m: &Matrix4<f32>, ui: &Ui) {
    ui.text(format!("{:+.3?}", m.row(0)));
    ui.text(format!("{:+.3?}", m.row(1)));
    ui.text(format!("{:+.3?}", m.row(2)));
    ui.text(format!("{:+.3?}", m.row(3)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn normal_matrix_of_uniform_scale_is_inverse_scale() {
        let model = Matrix4::from_scale(2.0);
        let normal = normal_matrix(&model);
        assert!(close(normal.x.x, 0.5));
        assert!(close(normal.y.y, 0.5));
        assert!(close(normal.z.z, 0.5));
    }

    #[test]
    fn normal_matrix_ignores_translation() {
        let model = Matrix4::from_translation(Vector3::new(4.0, -2.0, 7.0));
        assert_eq!(normal_matrix(&model), Matrix3::identity());
    }

    #[test]
    fn singular_model_falls_back_to_identity() {
        let model = Matrix4::from_scale(0.0);
        assert_eq!(normal_matrix(&model), Matrix3::identity());
    }

    #[test]
    fn model_matrix_applies_translation_last() {
        let m = model_matrix(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            Deg(90.0),
            0.5,
        );
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(close(p.x, 1.0));
        assert!(close(p.y, 2.5));
        assert!(close(p.z, 3.0));
    }

    #[test]
    fn zero_axis_means_no_rotation() {
        let m = model_matrix(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0), Deg(30.0), 1.0);
        assert_eq!(m, Matrix4::identity());
    }

    #[test]
    fn array_conversions_are_column_major() {
        let m = Matrix4::from_translation(Vector3::new(5.0, 6.0, 7.0));
        let a = mat4_array(&m);
        assert_eq!(a[3], [5.0, 6.0, 7.0, 1.0]);
        assert_eq!(vec_from_array3(&[1.0, 2.0, 3.0]), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn print_mat_has_four_rows() {
        assert_eq!(print_mat(&Matrix4::identity()).lines().count(), 5);
    }
}

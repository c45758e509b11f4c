pub mod processing;
pub mod projects;

pub use processing::{
    build_layers, crop_project, fill_project, flip_project, merge_palette, quantize_project,
    update_palette, ColorInput, FillRequest, LayerRequest, MergeRequest, PaletteUpdateRequest,
    QuantizeRequest,
};
pub use processing::{
    __path_build_layers, __path_crop_project, __path_fill_project, __path_flip_project,
    __path_merge_palette, __path_quantize_project, __path_update_palette,
};
pub use projects::{
    create_project, delete_project, export_project, get_image, get_project, list_projects,
    UploadForm,
};
pub use projects::{
    __path_create_project, __path_delete_project, __path_export_project, __path_get_image,
    __path_get_project, __path_list_projects,
};

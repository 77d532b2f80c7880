use super::*;

#[test]
fn layer_to_band_mapping_is_fixed() {
    assert_eq!(DepthBand::from_layer(0.0), DepthBand::DeepBackground);
    assert_eq!(DepthBand::from_layer(24.99), DepthBand::DeepBackground);
    assert_eq!(DepthBand::from_layer(25.0), DepthBand::MidBackground);
    assert_eq!(DepthBand::from_layer(50.0), DepthBand::Scene);
    assert_eq!(DepthBand::from_layer(75.0), DepthBand::Foreground);
    assert_eq!(DepthBand::from_layer(100.0), DepthBand::Foreground);
    assert_eq!(DepthBand::from_layer(-3.0), DepthBand::DeepBackground);
    assert_eq!(DepthBand::from_layer(f64::NAN), DepthBand::Scene);
    assert!(DepthBand::DeepBackground < DepthBand::Foreground);
}

#[test]
fn foreground_opaque_band_wins() {
    let mut set = DepthLayerSet::new(4, 3).unwrap();
    let colors = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];
    for (band, c) in [DepthBand::DeepBackground, DepthBand::Scene, DepthBand::Foreground]
        .into_iter()
        .zip(colors)
    {
        set.band_mut(band).clear(c);
    }

    let mut out = Surface::new(4, 3).unwrap();
    out.clear([0, 0, 0, 255]);
    set.composite_into(&mut out).unwrap();
    assert!(out.data().chunks_exact(4).all(|px| px == [0, 0, 255, 255]));
}

#[test]
fn transparent_bands_show_what_is_behind() {
    let mut set = DepthLayerSet::new(2, 2).unwrap();
    set.band_mut(DepthBand::MidBackground).clear([10, 20, 30, 255]);
    let mut out = Surface::new(2, 2).unwrap();
    set.composite_into(&mut out).unwrap();
    assert!(out.data().chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}

#[test]
fn resize_reallocates_and_clears() {
    let mut set = DepthLayerSet::new(2, 2).unwrap();
    set.band_mut(DepthBand::Scene).clear([1, 1, 1, 1]);
    set.resize(5, 7).unwrap();
    assert_eq!((set.width(), set.height()), (5, 7));
    assert_eq!(set.band_pixels(DepthBand::Scene).len(), 5 * 7 * 4);
    assert!(set.band_pixels(DepthBand::Scene).iter().all(|&b| b == 0));

    assert!(set.resize(0, 7).is_err());
    assert_eq!((set.width(), set.height()), (5, 7));
}

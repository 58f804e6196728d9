//! Data sources that can enrich a location

use crate::define_coded_vocabulary;

define_coded_vocabulary! {
    /// Enrichment provider selectable in enhance and bulk enhance requests.
    pub enum DataSource {
        Betterview => ("BV", "Betterview"),
        BingGeocoding => ("BG", "Bing Geocoding"),
        DistanceToCoast => ("DTC", "Distance To Coast"),
        EsriGeocoding => ("EG", "Esri Geocoding"),
        FemaFloodZone => ("FF", "FemaFloodZone"),
        E2ValueCommercialLite => ("E2V", "E2Value Commercial Lite"),
        E2ValueResidentialLite => ("E2VR", "E2Value Residential Lite"),
        GoogleGeocoding => ("GG", "Google Geocoding"),
        GoogleAddressValidation => ("GAV", "Google Address Validation"),
        Hazardhub => ("HH", "Hazardhub"),
        Katrisk => ("KR", "Katrisk"),
        LibPostal => ("LP", "LibPostal"),
        Lightbox => ("LB", "Lightbox"),
        LightboxParcel => ("LBP", "Lightbox Parcel"),
        LightboxGeocoding => ("LBG", "Lightbox Geocoding"),
        LightboxSpatialStream => ("LBSS", "Lightbox Spatial Stream"),
        LightboxFloodZone => ("LBFZ", "Lightbox Flood Zone"),
        MessyData => ("MD", "MessyData"),
        OpenAiGenericClassifier => ("OAGC", "OpenAI Generic Classifier"),
        PingGeocoding => ("PG", "Ping Geocoding"),
        PreciselyGeocoding => ("PSG", "Precisely Geocoding"),
        Noop => ("NOOP", "NoOp"),
        Quantarium => ("Q", "Quantarium"),
        Teren4d => ("T4D", "Teren4d"),
        Tensorflight => ("TF", "Tensorflight"),
        TigerRiskAir => ("TRAIR", "Tiger Risk AIR"),
        TigerRiskRms => ("TRRMS", "Tiger Risk RMS"),
        TigerGeocoding => ("TG", "Tiger Geocoding"),
        VeriskProperty => ("VP", "Verisk Property"),
        FemaNationalRiskIndex => ("FNRI", "Fema National Risk Index"),
        DistanceToFloridaSinkhole => ("DTFS", "Ping Distance To Florida Sinkhole"),
        RedzoneRisk => ("RZR", "Redzone Risk"),
        DistanceToFireStation => ("DTFST", "Ping Distance To Fire Station"),
        EsriReverseGeocoding => ("EGR", "Esri Reverse Geocoding"),
        PingOccupancy => ("PO", "Ping Occupancy"),
        LightboxReverseGeocoding => ("LBGR", "Lightbox Reverse Geocoding"),
        GoogleReverseGeocoding => ("GGR", "Google Reverse Geocoding"),
        BingReverseGeocoding => ("BGR", "Bing Reverse Geocoding"),
        PingFemaFloodZone => ("PFF", "Ping Fema Flood Zone"),
        SmartyStreetAddress => ("SM", "Smarty Street Address"),
        OfacApi => ("OFAC", "OFAC API"),
        CoreLogicNwFireRisk => ("CLNWFR", "CoreLogic NWFireRisk"),
        Geocodio => ("GIO", "Geocodio"),
        PingSloshZone => ("PSZ", "Ping Slosh Zone"),
        PingUsaConstruction => ("PUC", "Ping USA Construction"),
        AzureGeocoding => ("AZG", "Azure Geocoding"),
        RmsLossCostPricing => ("RMSLCP", "RMS Loss Cost Pricing"),
        IntermapFlood => ("IMF", "Intermap Flood"),
        CoreLogicWildfireRiskScore => ("CLWRS", "CoreLogic Wildfire Risk Score"),
        ReaskMetryc => ("REASKM", "Reask Metryc"),
    }
}
